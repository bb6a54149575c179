//! Capability namespaces bound as globals in every module.
//!
//! The table is built once per load; caller additions from
//! [`LoadOptions`](crate::LoadOptions) are applied over it.

use std::sync::Arc;

use sky_codec::{hash_module, json_module, url_module, yaml_module};
use sky_eval::{fail_builtin, struct_builtin, Namespace};
use sky_proto::{proto_module, TypeRegistry};

/// Names bound by [`capability_namespace`], in binding order.
pub const CAPABILITIES: [&str; 7] = ["proto", "json", "yaml", "url", "hash", "fail", "struct"];

pub fn capability_namespace(registry: &Arc<dyn TypeRegistry>) -> Namespace {
    let mut namespace = Namespace::new();
    namespace.set("proto", proto_module(Arc::clone(registry)));
    namespace.set("json", json_module());
    namespace.set("yaml", yaml_module());
    namespace.set("url", url_module());
    namespace.set("hash", hash_module());
    namespace.set("fail", fail_builtin());
    namespace.set("struct", struct_builtin());
    namespace
}
