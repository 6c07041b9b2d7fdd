//! `Array` and `Array.prototype`.

use std::cmp::Ordering;

use crate::builtins::{arg, link_prototype, method, static_method};
use crate::error::{EvalResult, Exception};
use crate::evaluator::Evaluator;
use crate::ops::{relative_index, to_integer};
use crate::realm::Realm;
use crate::value::{ArrayRef, Function, ObjectRef, Value};

const MAX_LENGTH: usize = 1 << 24;

fn this_array(this: &Value, name: &str) -> EvalResult<ArrayRef> {
    match this {
        Value::Array(items) => Ok(items.clone()),
        _ => Err(Exception::type_error(format!(
            "Array.prototype.{name} called on non-array"
        ))),
    }
}

fn callback(args: &[Value], name: &str) -> EvalResult<Value> {
    let func = arg(args, 0);
    if !func.is_callable() {
        return Err(Exception::type_error(format!(
            "{} is not a function (Array.prototype.{name})",
            func.type_of()
        )));
    }
    Ok(func)
}

fn same_value_zero(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x == y || (x.is_nan() && y.is_nan()),
        _ => a.strict_equals(b),
    }
}

/// Call `func(item, index, array)` for each element of a snapshot.
fn each(
    ev: &mut Evaluator,
    this: &Value,
    args: &[Value],
    name: &str,
    mut visit: impl FnMut(usize, &Value, Value) -> bool,
) -> EvalResult<()> {
    let items = this_array(this, name)?.borrow().clone();
    let func = callback(args, name)?;
    let receiver = arg(args, 1);
    for (i, item) in items.into_iter().enumerate() {
        let result = ev.call_function(
            &func,
            receiver.clone(),
            vec![item.clone(), Value::from(i), this.clone()],
        )?;
        if !visit(i, &item, result) {
            break;
        }
    }
    Ok(())
}

pub(crate) fn install_prototype(proto: &ObjectRef) {
    // ── Mutators ─────────────────────────────────────────────────────────
    method(proto, "push", 1, |_, this, args| {
        let items = this_array(this, "push")?;
        let mut items = items.borrow_mut();
        if items.len() + args.len() > MAX_LENGTH {
            return Err(Exception::range_error("Invalid array length"));
        }
        items.extend(args.iter().cloned());
        Ok(Value::from(items.len()))
    });
    method(proto, "pop", 0, |_, this, _| {
        let items = this_array(this, "pop")?;
        let popped = items.borrow_mut().pop();
        Ok(popped.unwrap_or_default())
    });
    method(proto, "shift", 0, |_, this, _| {
        let items = this_array(this, "shift")?;
        let mut items = items.borrow_mut();
        Ok(if items.is_empty() {
            Value::Undefined
        } else {
            items.remove(0)
        })
    });
    method(proto, "unshift", 1, |_, this, args| {
        let items = this_array(this, "unshift")?;
        let mut items = items.borrow_mut();
        items.splice(0..0, args.iter().cloned());
        Ok(Value::from(items.len()))
    });
    method(proto, "splice", 2, |ev, this, args| {
        let items = this_array(this, "splice")?;
        let len = items.borrow().len();
        let start = relative_index(ev.to_number(&arg(args, 0))?, len);
        let delete_count = match args.len() {
            0 => 0,
            1 => len - start,
            _ => {
                let n = to_integer(ev.to_number(&args[1])?);
                (n.max(0.0) as usize).min(len - start)
            }
        };
        let inserted = args.get(2..).map(<[Value]>::to_vec).unwrap_or_default();
        let removed: Vec<Value> = items
            .borrow_mut()
            .splice(start..start + delete_count, inserted)
            .collect();
        Ok(Value::array(removed))
    });
    method(proto, "reverse", 0, |_, this, _| {
        this_array(this, "reverse")?.borrow_mut().reverse();
        Ok(this.clone())
    });
    method(proto, "fill", 1, |ev, this, args| {
        let items = this_array(this, "fill")?;
        let len = items.borrow().len();
        let (start, end) = range_args(ev, args, 1, len)?;
        let value = arg(args, 0);
        for slot in items.borrow_mut().iter_mut().take(end).skip(start) {
            *slot = value.clone();
        }
        Ok(this.clone())
    });
    method(proto, "sort", 1, |ev, this, args| {
        let items = this_array(this, "sort")?;
        let snapshot = items.borrow().clone();
        let sorted = sort_values(ev, snapshot, &arg(args, 0))?;
        *items.borrow_mut() = sorted;
        Ok(this.clone())
    });

    // ── Copies ───────────────────────────────────────────────────────────
    method(proto, "slice", 2, |ev, this, args| {
        let items = this_array(this, "slice")?;
        let len = items.borrow().len();
        let (start, end) = range_args(ev, args, 0, len)?;
        let slice = items.borrow().get(start..end.max(start)).map(<[Value]>::to_vec);
        Ok(Value::array(slice.unwrap_or_default()))
    });
    method(proto, "concat", 1, |_, this, args| {
        let mut out = this_array(this, "concat")?.borrow().clone();
        for value in args {
            match value {
                Value::Array(more) => out.extend(more.borrow().iter().cloned()),
                other => out.push(other.clone()),
            }
        }
        Ok(Value::array(out))
    });
    method(proto, "flat", 0, |ev, this, args| {
        let items = this_array(this, "flat")?.borrow().clone();
        let depth = match arg(args, 0) {
            Value::Undefined => 1.0,
            d => to_integer(ev.to_number(&d)?),
        };
        let mut out = Vec::new();
        flatten(&items, depth, &mut out);
        Ok(Value::array(out))
    });
    method(proto, "flatMap", 1, |ev, this, args| {
        let mut mapped = Vec::new();
        each(ev, this, args, "flatMap", |_, _, result| {
            mapped.push(result);
            true
        })?;
        let mut out = Vec::new();
        flatten(&mapped, 1.0, &mut out);
        Ok(Value::array(out))
    });
    method(proto, "map", 1, |ev, this, args| {
        let mut out = Vec::new();
        each(ev, this, args, "map", |_, _, result| {
            out.push(result);
            true
        })?;
        Ok(Value::array(out))
    });
    method(proto, "filter", 1, |ev, this, args| {
        let mut out = Vec::new();
        each(ev, this, args, "filter", |_, item, result| {
            if result.is_truthy() {
                out.push(item.clone());
            }
            true
        })?;
        Ok(Value::array(out))
    });
    method(proto, "toSorted", 1, |ev, this, args| {
        let snapshot = this_array(this, "toSorted")?.borrow().clone();
        sort_values(ev, snapshot, &arg(args, 0)).map(Value::array)
    });
    method(proto, "toReversed", 0, |_, this, _| {
        let mut items = this_array(this, "toReversed")?.borrow().clone();
        items.reverse();
        Ok(Value::array(items))
    });

    // ── Iteration ────────────────────────────────────────────────────────
    method(proto, "forEach", 1, |ev, this, args| {
        each(ev, this, args, "forEach", |_, _, _| true)?;
        Ok(Value::Undefined)
    });
    method(proto, "some", 1, |ev, this, args| {
        let mut found = false;
        each(ev, this, args, "some", |_, _, result| {
            found = result.is_truthy();
            !found
        })?;
        Ok(Value::Bool(found))
    });
    method(proto, "every", 1, |ev, this, args| {
        let mut all = true;
        each(ev, this, args, "every", |_, _, result| {
            all = result.is_truthy();
            all
        })?;
        Ok(Value::Bool(all))
    });
    method(proto, "find", 1, |ev, this, args| {
        let mut found = Value::Undefined;
        each(ev, this, args, "find", |_, item, result| {
            if result.is_truthy() {
                found = item.clone();
                return false;
            }
            true
        })?;
        Ok(found)
    });
    method(proto, "findIndex", 1, |ev, this, args| {
        let mut found = -1.0;
        each(ev, this, args, "findIndex", |i, _, result| {
            if result.is_truthy() {
                found = i as f64;
                return false;
            }
            true
        })?;
        Ok(Value::Number(found))
    });
    method(proto, "findLast", 1, |ev, this, args| {
        let mut found = Value::Undefined;
        each(ev, this, args, "findLast", |_, item, result| {
            if result.is_truthy() {
                found = item.clone();
            }
            true
        })?;
        Ok(found)
    });
    method(proto, "findLastIndex", 1, |ev, this, args| {
        let mut found = -1.0;
        each(ev, this, args, "findLastIndex", |i, _, result| {
            if result.is_truthy() {
                found = i as f64;
            }
            true
        })?;
        Ok(Value::Number(found))
    });
    method(proto, "reduce", 1, |ev, this, args| reduce(ev, this, args, false));
    method(proto, "reduceRight", 1, |ev, this, args| reduce(ev, this, args, true));

    // ── Search ───────────────────────────────────────────────────────────
    method(proto, "indexOf", 1, |ev, this, args| {
        let items = this_array(this, "indexOf")?.borrow().clone();
        let from = match args.get(1) {
            Some(n) => relative_index(ev.to_number(n)?, items.len()),
            None => 0,
        };
        let target = arg(args, 0);
        let index = items
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, item)| item.strict_equals(&target))
            .map(|(i, _)| i as f64);
        Ok(Value::Number(index.unwrap_or(-1.0)))
    });
    method(proto, "lastIndexOf", 1, |_, this, args| {
        let items = this_array(this, "lastIndexOf")?.borrow().clone();
        let target = arg(args, 0);
        let index = items.iter().rposition(|item| item.strict_equals(&target));
        Ok(Value::Number(index.map(|i| i as f64).unwrap_or(-1.0)))
    });
    method(proto, "includes", 1, |_, this, args| {
        let items = this_array(this, "includes")?;
        let target = arg(args, 0);
        let found = items.borrow().iter().any(|item| same_value_zero(item, &target));
        Ok(Value::Bool(found))
    });
    method(proto, "at", 1, |ev, this, args| {
        let items = this_array(this, "at")?;
        let n = to_integer(ev.to_number(&arg(args, 0))?);
        let len = items.borrow().len() as f64;
        let index = if n < 0.0 { len + n } else { n };
        if index < 0.0 || index >= len {
            return Ok(Value::Undefined);
        }
        let item = items.borrow().get(index as usize).cloned().unwrap_or_default();
        Ok(item)
    });

    // ── Conversion ───────────────────────────────────────────────────────
    method(proto, "join", 1, |ev, this, args| {
        let items = this_array(this, "join")?.borrow().clone();
        let separator = match arg(args, 0) {
            Value::Undefined => ",".to_string(),
            sep => ev.to_js_string(&sep)?,
        };
        let mut parts = Vec::with_capacity(items.len());
        for item in &items {
            parts.push(match item {
                Value::Undefined | Value::Null => String::new(),
                other => ev.to_js_string(other)?,
            });
        }
        Ok(Value::from(parts.join(&separator)))
    });
    method(proto, "toString", 0, |_, this, _| Ok(Value::from(this.to_string())));
    method(proto, "keys", 0, |_, this, _| {
        let len = this_array(this, "keys")?.borrow().len();
        Ok(Value::array((0..len).map(Value::from).collect()))
    });
    method(proto, "entries", 0, |_, this, _| {
        let items = this_array(this, "entries")?.borrow().clone();
        Ok(Value::array(
            items
                .into_iter()
                .enumerate()
                .map(|(i, v)| Value::array(vec![Value::from(i), v]))
                .collect(),
        ))
    });
}

/// `start`/`end` arguments at `offset`, resolved against `len`.
fn range_args(ev: &mut Evaluator, args: &[Value], offset: usize, len: usize) -> EvalResult<(usize, usize)> {
    let start = match args.get(offset) {
        Some(Value::Undefined) | None => 0,
        Some(n) => relative_index(ev.to_number(n)?, len),
    };
    let end = match args.get(offset + 1) {
        Some(Value::Undefined) | None => len,
        Some(n) => relative_index(ev.to_number(n)?, len),
    };
    Ok((start, end))
}

fn flatten(items: &[Value], depth: f64, out: &mut Vec<Value>) {
    for item in items {
        match item {
            Value::Array(inner) if depth >= 1.0 => flatten(&inner.borrow(), depth - 1.0, out),
            other => out.push(other.clone()),
        }
    }
}

fn reduce(ev: &mut Evaluator, this: &Value, args: &[Value], from_right: bool) -> EvalResult<Value> {
    let name = if from_right { "reduceRight" } else { "reduce" };
    let mut items: Vec<(usize, Value)> = this_array(this, name)?
        .borrow()
        .iter()
        .cloned()
        .enumerate()
        .collect();
    if from_right {
        items.reverse();
    }
    let func = callback(args, name)?;
    let mut iter = items.into_iter();
    let mut acc = match args.get(1) {
        Some(initial) => initial.clone(),
        None => match iter.next() {
            Some((_, first)) => first,
            None => {
                return Err(Exception::type_error(
                    "Reduce of empty array with no initial value",
                ))
            }
        },
    };
    for (i, item) in iter {
        acc = ev.call_function(
            &func,
            Value::Undefined,
            vec![acc, item, Value::from(i), this.clone()],
        )?;
    }
    Ok(acc)
}

/// Stable merge sort with a comparator that may throw.
fn sort_values(ev: &mut Evaluator, items: Vec<Value>, comparator: &Value) -> EvalResult<Vec<Value>> {
    if !comparator.is_undefined() && !comparator.is_callable() {
        return Err(Exception::type_error(
            "The comparison function must be either a function or undefined",
        ));
    }
    // `undefined` always sorts last and is never passed to the comparator.
    let (mut defined, undefined): (Vec<Value>, Vec<Value>) =
        items.into_iter().partition(|v| !v.is_undefined());
    defined = merge_sort(ev, defined, comparator)?;
    defined.extend(undefined);
    Ok(defined)
}

fn merge_sort(ev: &mut Evaluator, mut items: Vec<Value>, comparator: &Value) -> EvalResult<Vec<Value>> {
    if items.len() <= 1 {
        return Ok(items);
    }
    let right = items.split_off(items.len() / 2);
    let left = merge_sort(ev, items, comparator)?;
    let right = merge_sort(ev, right, comparator)?;

    let mut out = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    while let (Some(l), Some(r)) = (left.peek(), right.peek()) {
        if compare(ev, l, r, comparator)? == Ordering::Greater {
            out.extend(right.next());
        } else {
            out.extend(left.next());
        }
    }
    out.extend(left);
    out.extend(right);
    Ok(out)
}

fn compare(ev: &mut Evaluator, a: &Value, b: &Value, comparator: &Value) -> EvalResult<Ordering> {
    if comparator.is_undefined() {
        let a = ev.to_js_string(a)?;
        let b = ev.to_js_string(b)?;
        return Ok(a.cmp(&b));
    }
    let result = ev.call_function(comparator, Value::Undefined, vec![a.clone(), b.clone()])?;
    let n = ev.to_number(&result)?;
    Ok(n.partial_cmp(&0.0).unwrap_or(Ordering::Equal))
}

pub(crate) fn constructor(realm: &Realm) -> Value {
    let array = Function::native_constructor("Array", 1, |_, _, args| {
        if let [Value::Number(n)] = args {
            let len = crate::value::as_index(*n)
                .filter(|len| *len <= MAX_LENGTH)
                .ok_or_else(|| Exception::range_error("Invalid array length"))?;
            return Ok(Value::array(vec![Value::Undefined; len]));
        }
        Ok(Value::array(args.to_vec()))
    });
    link_prototype(&array, &realm.array_proto);

    static_method(&array, "isArray", 1, |_, _, args| {
        Ok(Value::Bool(matches!(arg(args, 0), Value::Array(_))))
    });
    static_method(&array, "of", 0, |_, _, args| Ok(Value::array(args.to_vec())));
    static_method(&array, "from", 1, |ev, _, args| {
        let source = arg(args, 0);
        let items = match &source {
            Value::Array(_) | Value::String(_) => ev.iterate(&source)?,
            Value::Object(_) => {
                let len = ev.get_property(&source, "length")?;
                let len = ev.to_number(&len)?;
                let len = crate::value::as_index(len).unwrap_or(0).min(MAX_LENGTH);
                let mut items = Vec::with_capacity(len);
                for i in 0..len {
                    items.push(ev.get_property(&source, &i.to_string())?);
                }
                items
            }
            Value::Undefined | Value::Null => {
                return Err(Exception::type_error(format!("{source} is not iterable")))
            }
            _ => Vec::new(),
        };
        let map = arg(args, 1);
        if map.is_undefined() {
            return Ok(Value::array(items));
        }
        if !map.is_callable() {
            return Err(Exception::type_error(format!("{map} is not a function")));
        }
        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.into_iter().enumerate() {
            out.push(ev.call_function(&map, Value::Undefined, vec![item, Value::from(i)])?);
        }
        Ok(Value::array(out))
    });

    Value::Function(array)
}
