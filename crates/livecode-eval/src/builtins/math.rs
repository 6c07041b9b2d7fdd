//! `Math`. `Math.random` is deterministic per evaluator.

use std::f64::consts;

use crate::builtins::{arg, method, namespace};
use crate::realm::Realm;
use crate::value::Value;

macro_rules! unary {
    ($obj:expr, $($name:literal => $f:expr),* $(,)?) => {
        $(
            method($obj, $name, 1, |ev, _, args| {
                let x = ev.to_number(&arg(args, 0))?;
                let f: fn(f64) -> f64 = $f;
                Ok(Value::Number(f(x)))
            });
        )*
    };
}

/// `Math.round`: halves round towards positive infinity.
pub fn js_round(x: f64) -> f64 {
    if !x.is_finite() || x.fract() == 0.0 {
        return x;
    }
    (x + 0.5).floor()
}

pub(crate) fn object(realm: &Realm) -> Value {
    let math = namespace(realm);
    for (name, value) in [
        ("PI", consts::PI),
        ("E", consts::E),
        ("LN2", consts::LN_2),
        ("LN10", consts::LN_10),
        ("LOG2E", consts::LOG2_E),
        ("LOG10E", consts::LOG10_E),
        ("SQRT2", consts::SQRT_2),
        ("SQRT1_2", consts::FRAC_1_SQRT_2),
    ] {
        math.insert(name, Value::Number(value));
    }

    unary!(&math,
        "abs" => f64::abs,
        "floor" => f64::floor,
        "ceil" => f64::ceil,
        "round" => js_round,
        "trunc" => f64::trunc,
        "sign" => |x| if x.is_nan() || x == 0.0 { x } else { x.signum() },
        "sqrt" => f64::sqrt,
        "cbrt" => f64::cbrt,
        "exp" => f64::exp,
        "log" => f64::ln,
        "log2" => f64::log2,
        "log10" => f64::log10,
        "sin" => f64::sin,
        "cos" => f64::cos,
        "tan" => f64::tan,
        "asin" => f64::asin,
        "acos" => f64::acos,
        "atan" => f64::atan,
    );

    method(&math, "pow", 2, |ev, _, args| {
        let base = ev.to_number(&arg(args, 0))?;
        let exponent = ev.to_number(&arg(args, 1))?;
        Ok(Value::Number(crate::ops::arithmetic(
            livecode_types::ast::BinOp::Pow,
            base,
            exponent,
        )))
    });
    method(&math, "atan2", 2, |ev, _, args| {
        let y = ev.to_number(&arg(args, 0))?;
        let x = ev.to_number(&arg(args, 1))?;
        Ok(Value::Number(y.atan2(x)))
    });
    method(&math, "hypot", 2, |ev, _, args| {
        let mut sum = 0.0;
        for value in args {
            let n = ev.to_number(value)?;
            sum += n * n;
        }
        Ok(Value::Number(sum.sqrt()))
    });
    method(&math, "max", 2, |ev, _, args| {
        let mut result = f64::NEG_INFINITY;
        for value in args {
            let n = ev.to_number(value)?;
            if n.is_nan() {
                return Ok(Value::Number(f64::NAN));
            }
            result = result.max(n);
        }
        Ok(Value::Number(result))
    });
    method(&math, "min", 2, |ev, _, args| {
        let mut result = f64::INFINITY;
        for value in args {
            let n = ev.to_number(value)?;
            if n.is_nan() {
                return Ok(Value::Number(f64::NAN));
            }
            result = result.min(n);
        }
        Ok(Value::Number(result))
    });
    method(&math, "random", 0, |ev, _, _| Ok(Value::Number(ev.next_random())));

    Value::Object(math)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_round() {
        assert_eq!(js_round(2.5), 3.0);
        assert_eq!(js_round(-2.5), -2.0);
        assert_eq!(js_round(-2.6), -3.0);
        assert_eq!(js_round(7.0), 7.0);
    }
}
