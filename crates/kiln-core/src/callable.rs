//! Invokable script values.

use crate::error::RuntimeError;
use crate::value::Value;

/// Anything callable from script: interpreted functions, arrow functions,
/// bound methods, native callbacks.
///
/// The interop bridge treats callables opaquely; it only needs `call` (to
/// bridge them into single-method host interfaces) and `name` (for
/// diagnostics).
pub trait Callable: Send + Sync {
    /// Function name for diagnostics; empty for anonymous functions
    fn name(&self) -> &str {
        ""
    }

    /// Rendering used by string conversion. Implementations that stand in
    /// for data (bound host members shadowing a field) may override this.
    fn to_display(&self) -> String {
        let name = self.name();
        if name.is_empty() {
            "function".to_string()
        } else {
            format!("function {name}")
        }
    }

    /// Invoke with the given arguments
    fn call(&self, args: &[Value]) -> Result<Value, RuntimeError>;
}

/// A callable backed by a Rust closure.
pub struct NativeFunction {
    name: String,
    func: Box<dyn Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync>,
}

impl NativeFunction {
    /// Create a named native function
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Box::new(func),
        }
    }
}

impl Callable for NativeFunction {
    fn name(&self) -> &str {
        &self.name
    }

    fn call(&self, args: &[Value]) -> Result<Value, RuntimeError> {
        (self.func)(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_function_call() {
        let double = NativeFunction::new("double", |args| {
            let n = args[0].as_number().unwrap_or(0.0);
            Ok(Value::Number(n * 2.0))
        });
        assert_eq!(double.name(), "double");
        assert_eq!(double.to_display(), "function double");
        let out = double.call(&[Value::Number(21.0)]).unwrap();
        assert_eq!(out.as_number(), Some(42.0));
    }
}
