use std::collections::HashMap;
use std::fmt::Display;

use crate::error::{Error, Eval};
use crate::number::Number;


/// Signature of all prelude functions. Operands arrive in source order.
pub type PreludeFn = fn(&[Number]) -> Result<Number, Error>;


/// The number of operands a prelude function accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            Self::Exactly(n) => count == *n,
            Self::AtLeast(n) => count >= *n,
        }
    }
}

impl Display for Arity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exactly(1) => f.write_str("exactly 1 argument"),
            Self::Exactly(n) => f.write_fmt(format_args!("exactly {} arguments", n)),
            Self::AtLeast(1) => f.write_str("at least 1 argument"),
            Self::AtLeast(n) => f.write_fmt(format_args!("at least {} arguments", n)),
        }
    }
}


/// A named prelude function with its arity.
#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub arity: Arity,
    pub func: PreludeFn,
}

impl std::fmt::Debug for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("Builtin({}, {:?})", self.name, self.arity))
    }
}

impl Builtin {
    /// Check the operand count, then apply the function.
    pub fn call(&self, args: &[Number]) -> Result<Number, Error> {
        if !self.arity.accepts(args.len()) {
            return Err(arg_count(self.name, self.arity, args.len()));
        }
        (self.func)(args)
    }
}


macro_rules! builtin {
    ($m: ident, $name: literal, $arity: expr, $e: ident) => {
        $m.insert(
            $name,
            Builtin {
                name: $name,
                arity: $arity,
                func: $e,
            },
        )
    };
}


/// The registry of built-in functions.
///
/// Built once and never modified afterwards. The evaluator receives it by
/// reference, so there is no global table.
#[derive(Debug, Clone)]
pub struct Prelude {
    registered: HashMap<&'static str, Builtin>,
}

impl Default for Prelude {
    fn default() -> Self {
        Self::new()
    }
}

impl Prelude {
    pub fn new() -> Prelude {
        let mut m = HashMap::new();
        builtin!(m, "+", Arity::AtLeast(1), add);
        builtin!(m, "-", Arity::AtLeast(1), sub);
        builtin!(m, "*", Arity::AtLeast(1), mul);
        builtin!(m, "/", Arity::AtLeast(1), div);
        builtin!(m, "min", Arity::AtLeast(1), min);
        builtin!(m, "max", Arity::AtLeast(1), max);
        builtin!(m, "sqrt", Arity::Exactly(1), sqrt);
        builtin!(m, "neg", Arity::Exactly(1), neg);
        builtin!(m, "abs", Arity::Exactly(1), abs);
        builtin!(m, "count", Arity::AtLeast(1), count);
        Prelude { registered: m }
    }

    /// Look up a function by name. Names are case sensitive.
    pub fn get(&self, name: &str) -> Option<&Builtin> {
        self.registered.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.registered.contains_key(name)
    }

    /// All registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.registered.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Call the named function. Unknown names are reported as undefined.
    pub fn apply(&self, name: &str, args: &[Number]) -> Result<Number, Error> {
        self.get(name)
            .ok_or_else(|| Error::new(Eval::UndefinedFunction(name.to_owned())))
            .and_then(|builtin| builtin.call(args))
    }
}


fn arg_count(name: &str, arity: Arity, received: usize) -> Error {
    Error::new(Eval::ArgCount {
        name: name.to_owned(),
        arity,
        received,
    })
}


/// Left fold over the operands, starting with the first.
fn fold(
    name: &str,
    args: &[Number],
    mut f: impl FnMut(Number, &Number) -> Result<Number, Error>,
) -> Result<Number, Error> {
    let (first, rest) = args.split_first().ok_or_else(|| arg_count(name, Arity::AtLeast(1), 0))?;
    rest.iter().try_fold(first.clone(), |acc, x| f(acc, x))
}


/// The single operand of a unary function.
fn single<'a>(name: &str, args: &'a [Number]) -> Result<&'a Number, Error> {
    match args {
        [x] => Ok(x),
        _ => Err(arg_count(name, Arity::Exactly(1), args.len())),
    }
}


fn add(args: &[Number]) -> Result<Number, Error> {
    fold("+", args, |acc, x| Ok(acc.add(x)))
}


fn sub(args: &[Number]) -> Result<Number, Error> {
    fold("-", args, |acc, x| Ok(acc.sub(x)))
}


fn mul(args: &[Number]) -> Result<Number, Error> {
    fold("*", args, |acc, x| Ok(acc.mul(x)))
}


fn div(args: &[Number]) -> Result<Number, Error> {
    fold("/", args, |acc, x| acc.div(x))
}


fn min(args: &[Number]) -> Result<Number, Error> {
    fold("min", args, |acc, x| Ok(if x < &acc { x.clone() } else { acc }))
}


fn max(args: &[Number]) -> Result<Number, Error> {
    fold("max", args, |acc, x| Ok(if x > &acc { x.clone() } else { acc }))
}


fn sqrt(args: &[Number]) -> Result<Number, Error> {
    single("sqrt", args)?.sqrt()
}


fn neg(args: &[Number]) -> Result<Number, Error> {
    Ok(single("neg", args)?.neg())
}


fn abs(args: &[Number]) -> Result<Number, Error> {
    Ok(single("abs", args)?.abs())
}


fn count(args: &[Number]) -> Result<Number, Error> {
    match args.len() {
        0 => Err(arg_count("count", Arity::AtLeast(1), 0)),
        n => Ok(Number::from(n)),
    }
}
