//! The intrinsic prototype objects shared by every value an evaluator
//! creates.

use crate::builtins;
use crate::error::ErrorKind;
use crate::value::{Object, ObjectRef, Value};

pub struct Realm {
    pub object_proto: ObjectRef,
    pub function_proto: ObjectRef,
    pub array_proto: ObjectRef,
    pub string_proto: ObjectRef,
    pub number_proto: ObjectRef,
    pub boolean_proto: ObjectRef,
    error_protos: Vec<(ErrorKind, ObjectRef)>,
}

impl Realm {
    pub fn new() -> Self {
        let object_proto = Object::with_proto(None);
        builtins::object::install_prototype(&object_proto);

        let derived = |install: fn(&ObjectRef)| {
            let proto = Object::with_proto(Some(object_proto.clone()));
            install(&proto);
            proto
        };
        let function_proto = derived(builtins::function::install_prototype);
        let array_proto = derived(builtins::array::install_prototype);
        let string_proto = derived(builtins::string::install_prototype);
        let number_proto = derived(builtins::number::install_prototype);
        let boolean_proto = derived(builtins::number::install_boolean_prototype);

        let base_error = derived(builtins::error::install_prototype);
        base_error.insert("name", Value::from("Error"));
        base_error.mark_error();
        let error_protos = ErrorKind::ALL
            .iter()
            .map(|&kind| {
                if kind == ErrorKind::Error {
                    return (kind, base_error.clone());
                }
                let proto = Object::with_proto(Some(base_error.clone()));
                proto.insert("name", Value::from(kind.name()));
                proto.insert("message", Value::from(""));
                (kind, proto)
            })
            .collect();

        Self {
            object_proto,
            function_proto,
            array_proto,
            string_proto,
            number_proto,
            boolean_proto,
            error_protos,
        }
    }

    pub fn error_proto(&self, kind: ErrorKind) -> ObjectRef {
        self.error_protos
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, proto)| proto.clone())
            .unwrap_or_else(|| self.error_protos[0].1.clone())
    }
}

impl Default for Realm {
    fn default() -> Self {
        Self::new()
    }
}
