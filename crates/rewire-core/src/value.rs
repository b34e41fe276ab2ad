use std::any::Any;
use std::rc::Rc;

use thiserror::Error;

/// Opaque store value. The store never inspects these; a codec at the edge
/// converts between blobs and typed values.
pub type Value = Rc<dyn Any>;

#[derive(Debug, Error)]
pub enum ValueError {
    #[error("no value stored under key `{0}`")]
    Missing(String),
    #[error("value under key `{key}` is not a `{expected}`")]
    TypeMismatch { key: String, expected: &'static str },
}

/// Wrap a typed value into an opaque blob.
pub fn encode<T: 'static>(value: T) -> Value {
    Rc::new(value)
}

/// Decode a blob back into `T` by cloning out of the `Rc`.
pub fn decode<T: Clone + 'static>(key: &str, value: &Value) -> Result<T, ValueError> {
    value
        .downcast_ref::<T>()
        .cloned()
        .ok_or_else(|| ValueError::TypeMismatch {
            key: key.to_owned(),
            expected: std::any::type_name::<T>(),
        })
}
