use std::fmt::Write;

use sha2::{Digest, Sha256};
use sky_eval::args::{arg, expect_str};
use sky_eval::{Arguments, EvalResult, Interpreter, Value};

use crate::module;

pub fn hash_module() -> Value {
    module("hash", &[("sha256", sha256)])
}

/// `hash.sha256(s)`: lowercase hex digest of the UTF-8 bytes of `s`.
fn sha256(_: &mut Interpreter, args: Arguments) -> EvalResult {
    let [s] = args.bind("hash.sha256", ["s"])?;
    let s = expect_str("hash.sha256", "s", &arg(s))?;
    Ok(Value::from(to_hex(&Sha256::digest(s.as_bytes()))))
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::test_support::{eval, eval_err};

    #[test]
    fn sha256_hex_digest() {
        assert_eq!(
            eval(r#"hash.sha256("")"#),
            "\"e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855\""
        );
        assert_eq!(
            eval(r#"hash.sha256("abc")"#),
            "\"ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad\""
        );
    }

    #[test]
    fn sha256_wants_a_string() {
        assert_eq!(
            eval_err("hash.sha256(1)"),
            "hash.sha256: for parameter s: got int, want string"
        );
    }
}
