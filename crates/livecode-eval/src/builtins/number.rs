//! `Number`, `Boolean`, `parseInt` and `parseFloat`.

use crate::builtins::{arg, link_prototype, method, static_method};
use crate::error::{EvalResult, Exception};
use crate::evaluator::Evaluator;
use crate::ops::to_integer;
use crate::realm::Realm;
use crate::value::{number_to_string, Function, ObjectRef, Value};

fn this_number(this: &Value) -> EvalResult<f64> {
    match this {
        Value::Number(n) => Ok(*n),
        _ => Err(Exception::type_error(
            "Number.prototype method called on incompatible receiver",
        )),
    }
}

fn fraction_digits(ev: &mut Evaluator, value: &Value, max: f64) -> EvalResult<usize> {
    let digits = match value {
        Value::Undefined => 0.0,
        v => to_integer(ev.to_number(v)?),
    };
    if !(0.0..=max).contains(&digits) {
        return Err(Exception::range_error(
            "toFixed() digits argument must be between 0 and 100",
        ));
    }
    Ok(digits as usize)
}

/// `toFixed`: ties round away from zero.
pub fn to_fixed(n: f64, digits: usize) -> String {
    if !n.is_finite() {
        return number_to_string(n);
    }
    if n.abs() >= 1e21 {
        return number_to_string(n);
    }
    let scale = 10f64.powi(digits as i32);
    let scaled = n.abs() * scale;
    let text = if scaled.fract() == 0.5 && scaled < 9_007_199_254_740_992.0 {
        format!("{:.*}", digits, (scaled.floor() + 1.0) / scale)
    } else {
        format!("{:.*}", digits, n.abs())
    };
    if n < 0.0 {
        format!("-{text}")
    } else {
        text
    }
}

/// `toString(radix)` for radixes other than 10.
pub fn to_radix_string(n: f64, radix: u32) -> String {
    if !n.is_finite() || radix == 10 {
        return number_to_string(n);
    }
    let negative = n < 0.0;
    let n = n.abs();
    let mut int = n.trunc();
    let mut frac = n.fract();

    let mut digits = Vec::new();
    if int == 0.0 {
        digits.push('0');
    }
    while int >= 1.0 {
        let d = (int % f64::from(radix)) as u32;
        digits.push(std::char::from_digit(d, radix).unwrap_or('0'));
        int = (int / f64::from(radix)).trunc();
    }
    digits.reverse();
    let mut out: String = digits.into_iter().collect();
    if frac > 0.0 {
        out.push('.');
        for _ in 0..52 {
            frac *= f64::from(radix);
            let d = frac.trunc() as u32;
            out.push(std::char::from_digit(d, radix).unwrap_or('0'));
            frac = frac.fract();
            if frac == 0.0 {
                break;
            }
        }
    }
    if negative {
        format!("-{out}")
    } else {
        out
    }
}

/// `toLocaleString()` in the `en-US` shape: grouped thousands and at most
/// three fraction digits.
pub fn to_locale_string(n: f64) -> String {
    if !n.is_finite() {
        return number_to_string(n);
    }
    let fixed = to_fixed(n, 3);
    let (sign, fixed) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (int, frac) = fixed.split_once('.').unwrap_or((fixed, ""));
    let frac = frac.trim_end_matches('0');

    let mut grouped = String::with_capacity(int.len() + int.len() / 3);
    for (i, c) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if frac.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac}")
    }
}

fn to_precision(n: f64, precision: usize) -> String {
    if !n.is_finite() || n == 0.0 {
        return to_fixed(n, precision.saturating_sub(1));
    }
    let exponent = n.abs().log10().floor() as i32;
    if exponent < -6 || exponent >= precision as i32 {
        let text = format!("{:.*e}", precision - 1, n);
        return match text.split_once('e') {
            Some((mantissa, exp)) if exp.starts_with('-') => format!("{mantissa}e{exp}"),
            Some((mantissa, exp)) => format!("{mantissa}e+{exp}"),
            None => text,
        };
    }
    to_fixed(n, (precision as i32 - 1 - exponent).max(0) as usize)
}

pub(crate) fn install_prototype(proto: &ObjectRef) {
    method(proto, "toFixed", 1, |ev, this, args| {
        let n = this_number(this)?;
        let digits = fraction_digits(ev, &arg(args, 0), 100.0)?;
        Ok(Value::from(to_fixed(n, digits)))
    });
    method(proto, "toPrecision", 1, |ev, this, args| {
        let n = this_number(this)?;
        let precision = match arg(args, 0) {
            Value::Undefined => return Ok(Value::from(number_to_string(n))),
            p => to_integer(ev.to_number(&p)?),
        };
        if !(1.0..=100.0).contains(&precision) {
            return Err(Exception::range_error(
                "toPrecision() argument must be between 1 and 100",
            ));
        }
        Ok(Value::from(to_precision(n, precision as usize)))
    });
    method(proto, "toString", 1, |ev, this, args| {
        let n = this_number(this)?;
        let radix = match arg(args, 0) {
            Value::Undefined => 10.0,
            r => to_integer(ev.to_number(&r)?),
        };
        if !(2.0..=36.0).contains(&radix) {
            return Err(Exception::range_error(
                "toString() radix must be between 2 and 36",
            ));
        }
        Ok(Value::from(to_radix_string(n, radix as u32)))
    });
    method(proto, "toLocaleString", 0, |_, this, _| {
        Ok(Value::from(to_locale_string(this_number(this)?)))
    });
    method(proto, "valueOf", 0, |_, this, _| this_number(this).map(Value::Number));
}

pub(crate) fn install_boolean_prototype(proto: &ObjectRef) {
    fn this_bool(this: &Value) -> EvalResult<bool> {
        match this {
            Value::Bool(b) => Ok(*b),
            _ => Err(Exception::type_error(
                "Boolean.prototype method called on incompatible receiver",
            )),
        }
    }
    method(proto, "toString", 0, |_, this, _| {
        Ok(Value::from(this_bool(this)?.to_string()))
    });
    method(proto, "valueOf", 0, |_, this, _| this_bool(this).map(Value::Bool));
}

pub(crate) fn parse_int(ev: &mut Evaluator, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    let input = ev.to_js_string(&arg(args, 0))?;
    let mut s = input.trim();
    let negative = s.starts_with('-');
    if let Some(rest) = s.strip_prefix(['-', '+']) {
        s = rest;
    }
    let mut radix = match arg(args, 1) {
        Value::Undefined => 0,
        r => to_integer(ev.to_number(&r)?) as u32,
    };
    if radix != 0 && !(2..=36).contains(&radix) {
        return Ok(Value::Number(f64::NAN));
    }
    if radix == 0 || radix == 16 {
        if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            s = rest;
            radix = 16;
        }
    }
    if radix == 0 {
        radix = 10;
    }
    let mut value: Option<f64> = None;
    for c in s.chars() {
        let Some(d) = c.to_digit(radix) else {
            break;
        };
        value = Some(value.unwrap_or(0.0) * f64::from(radix) + f64::from(d));
    }
    Ok(Value::Number(match value {
        Some(v) if negative => -v,
        Some(v) => v,
        None => f64::NAN,
    }))
}

pub(crate) fn parse_float(ev: &mut Evaluator, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    let input = ev.to_js_string(&arg(args, 0))?;
    Ok(Value::Number(parse_float_prefix(input.trim_start())))
}

/// The longest prefix of `s` that reads as a decimal literal.
fn parse_float_prefix(s: &str) -> f64 {
    let unsigned = s.trim_start_matches(['+', '-']);
    if unsigned.starts_with("Infinity") && s.len() - unsigned.len() <= 1 {
        return if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let digits_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    if bytes.get(end) == Some(&b'.') {
        end += 1;
        while bytes.get(end).is_some_and(u8::is_ascii_digit) {
            end += 1;
        }
    }
    if end == digits_start || &s[digits_start..end] == "." {
        return f64::NAN;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        if bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
                exp_end += 1;
            }
            end = exp_end;
        }
    }
    s[..end].parse().unwrap_or(f64::NAN)
}

pub(crate) fn constructor(realm: &Realm) -> Value {
    let number = Function::native("Number", 1, |ev, _, args| match args.first() {
        None => Ok(Value::Number(0.0)),
        Some(value) => ev.to_number(value).map(Value::Number),
    });
    link_prototype(&number, &realm.number_proto);

    for (name, value) in [
        ("MAX_SAFE_INTEGER", 9_007_199_254_740_991.0),
        ("MIN_SAFE_INTEGER", -9_007_199_254_740_991.0),
        ("EPSILON", f64::EPSILON),
        ("MAX_VALUE", f64::MAX),
        ("MIN_VALUE", 5e-324),
        ("POSITIVE_INFINITY", f64::INFINITY),
        ("NEGATIVE_INFINITY", f64::NEG_INFINITY),
        ("NaN", f64::NAN),
    ] {
        number.set(name, Value::Number(value));
    }
    static_method(&number, "isInteger", 1, |_, _, args| {
        Ok(Value::Bool(matches!(arg(args, 0), Value::Number(n) if n.is_finite() && n.fract() == 0.0)))
    });
    static_method(&number, "isSafeInteger", 1, |_, _, args| {
        Ok(Value::Bool(matches!(
            arg(args, 0),
            Value::Number(n) if n.fract() == 0.0 && n.abs() <= 9_007_199_254_740_991.0
        )))
    });
    static_method(&number, "isFinite", 1, |_, _, args| {
        Ok(Value::Bool(matches!(arg(args, 0), Value::Number(n) if n.is_finite())))
    });
    static_method(&number, "isNaN", 1, |_, _, args| {
        Ok(Value::Bool(matches!(arg(args, 0), Value::Number(n) if n.is_nan())))
    });
    number.set("parseInt", Value::native("parseInt", 2, parse_int));
    number.set("parseFloat", Value::native("parseFloat", 1, parse_float));

    Value::Function(number)
}

pub(crate) fn boolean_constructor(realm: &Realm) -> Value {
    let boolean = Function::native("Boolean", 1, |_, _, args| {
        Ok(Value::Bool(arg(args, 0).is_truthy()))
    });
    link_prototype(&boolean, &realm.boolean_proto);
    Value::Function(boolean)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_fixed_rounds_ties_up() {
        assert_eq!(to_fixed(2.5, 0), "3");
        assert_eq!(to_fixed(1.25, 1), "1.3");
        assert_eq!(to_fixed(3.14159, 2), "3.14");
        assert_eq!(to_fixed(-0.0001, 2), "-0.00");
        assert_eq!(to_fixed(-1.5, 0), "-2");
    }

    #[test]
    fn test_to_radix_string() {
        assert_eq!(to_radix_string(255.0, 16), "ff");
        assert_eq!(to_radix_string(-10.0, 2), "-1010");
        assert_eq!(to_radix_string(0.5, 2), "0.1");
    }

    #[test]
    fn test_to_locale_string() {
        assert_eq!(to_locale_string(1234567.891), "1,234,567.891");
        assert_eq!(to_locale_string(1000.0), "1,000");
        assert_eq!(to_locale_string(-999.5), "-999.5");
    }

    #[test]
    fn test_parse_float_prefix() {
        assert_eq!(parse_float_prefix("3.14abc"), 3.14);
        assert_eq!(parse_float_prefix("1e3x"), 1000.0);
        assert_eq!(parse_float_prefix("2e"), 2.0);
        assert!(parse_float_prefix("abc").is_nan());
        assert_eq!(parse_float_prefix("-Infinity"), f64::NEG_INFINITY);
    }
}
