use sky_eval::args::{arg, expect_dict};
use sky_eval::{Arguments, EvalError, EvalResult, Interpreter, Value};
use url::form_urlencoded;

use crate::module;

pub fn url_module() -> Value {
    module("url", &[("encode_query", encode_query)])
}

/// `url.encode_query(d)`: form-encode a string-to-string dict, keeping its
/// order. Spaces become `+`.
fn encode_query(_: &mut Interpreter, args: Arguments) -> EvalResult {
    let [d] = args.bind("url.encode_query", ["d"])?;
    let dict = expect_dict("url.encode_query", "d", &arg(d))?;
    let mut query = form_urlencoded::Serializer::new(String::new());
    for (key, value) in dict.items() {
        let (Value::Str(k), Value::Str(v)) = (&key, &value) else {
            return Err(EvalError::new(format!(
                "url.encode_query: got {} {}: {}, want string keys and values",
                key.type_name(),
                key.repr(),
                value.type_name()
            )));
        };
        query.append_pair(k, v);
    }
    Ok(Value::from(query.finish()))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;

    use crate::test_support::{eval, eval_err};

    #[test]
    fn encodes_in_insertion_order() {
        assert_eq!(
            eval(r#"url.encode_query({"a": "value1 value2", "b": "/test/path"})"#),
            r#""a=value1+value2&b=%2Ftest%2Fpath""#
        );
        assert_eq!(
            eval(r#"url.encode_query({"z": "1", "a": "2&3"})"#),
            r#""z=1&a=2%263""#
        );
        assert_eq!(eval("url.encode_query({})"), r#""""#);
    }

    #[test]
    fn rejects_non_string_pairs() {
        assert_eq!(
            eval_err(r#"url.encode_query({1: "a"})"#),
            "url.encode_query: got int 1: string, want string keys and values"
        );
        assert_eq!(
            eval_err(r#"url.encode_query({"a": 1})"#),
            "url.encode_query: got string \"a\": int, want string keys and values"
        );
        assert_eq!(
            eval_err(r#"url.encode_query(["a"])"#),
            "url.encode_query: for parameter d: got list, want dict"
        );
    }
}
