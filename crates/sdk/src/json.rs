use serde_json::Value;

/// Loose truthiness, as the API's own clients evaluate flags such as
/// `meta.status`: `null`, `false`, `0` and `""` are false, everything else
/// (including empty arrays and objects) is true.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Rewrite whole-valued floats (`300.0`) as integers so serialization
/// matches `JSON.stringify`, which never prints a fractional zero.
pub(crate) fn normalize_numbers(value: &mut Value) {
    match value {
        Value::Number(number) if number.is_f64() => {
            if let Some(whole) = number
                .as_f64()
                .filter(|n| n.fract() == 0.0 && n.abs() < i64::MAX as f64)
            {
                *number = (whole as i64).into();
            }
        }
        Value::Array(items) => items.iter_mut().for_each(normalize_numbers),
        Value::Object(fields) => fields.values_mut().for_each(normalize_numbers),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn whole_floats_become_integers() {
        let mut value = json!({"max_time": 300.0, "nested": [1.5, -2.0, -0.0], "id": 7});
        normalize_numbers(&mut value);
        assert_eq!(value.to_string(), r#"{"max_time":300,"nested":[1.5,-2,0],"id":7}"#);
    }

    #[test]
    fn huge_floats_are_left_alone() {
        let mut value = json!([1e300]);
        normalize_numbers(&mut value);
        assert_eq!(value, json!([1e300]));
    }

    #[test]
    fn falsy_values() {
        for value in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            assert!(!is_truthy(&value), "{value} should be falsy");
        }
    }

    #[test]
    fn truthy_values() {
        for value in [json!(true), json!(1), json!("x"), json!([]), json!({})] {
            assert!(is_truthy(&value), "{value} should be truthy");
        }
    }
}
