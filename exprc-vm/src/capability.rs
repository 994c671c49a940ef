//! Capability namespaces for extern functions
//!
//! An `extern_func` instruction binds a name by searching the interpreter's
//! capability list in order. Only functions exposed through a capability
//! can ever be called by a program.

use crate::vm::Value;

/// Host implementation behind an extern function
#[derive(Debug, Clone, Copy)]
pub enum NativeCall {
    /// Numeric function of one float
    Unary(fn(f64) -> f64),
    /// Numeric function of two floats
    Binary(fn(f64, f64) -> f64),
    /// Anything else; receives the raw argument values
    Raw(fn(&[Value]) -> Result<Value, String>),
}

#[derive(Debug, Clone, Copy)]
pub struct NativeFunction {
    pub arity: usize,
    pub call: NativeCall,
}

impl NativeFunction {
    pub fn unary(f: fn(f64) -> f64) -> Self {
        Self { arity: 1, call: NativeCall::Unary(f) }
    }

    pub fn binary(f: fn(f64, f64) -> f64) -> Self {
        Self { arity: 2, call: NativeCall::Binary(f) }
    }

    pub fn raw(arity: usize, f: fn(&[Value]) -> Result<Value, String>) -> Self {
        Self { arity, call: NativeCall::Raw(f) }
    }

    /// Call the host function; the error is a plain message for the caller
    /// to wrap with the function name
    pub fn invoke(&self, args: &[Value]) -> Result<Value, String> {
        if args.len() != self.arity {
            return Err(format!("takes {} arguments, {} given", self.arity, args.len()));
        }
        match self.call {
            NativeCall::Unary(f) => Ok(Value::Float(f(numeric(args, 0)?))),
            NativeCall::Binary(f) => Ok(Value::Float(f(numeric(args, 0)?, numeric(args, 1)?))),
            NativeCall::Raw(f) => f(args),
        }
    }
}

fn numeric(args: &[Value], index: usize) -> Result<f64, String> {
    match args.get(index) {
        Some(value) => value
            .as_f64()
            .ok_or_else(|| format!("argument {index} must be numeric, got {}", value.type_name())),
        None => Err(format!("missing argument {index}")),
    }
}

/// A namespace of host functions a program may bind
pub trait Capability {
    fn namespace(&self) -> &'static str;

    fn lookup(&self, name: &str) -> Option<NativeFunction>;
}

/// Floating point functions
pub struct MathCapability;

impl Capability for MathCapability {
    fn namespace(&self) -> &'static str {
        "math"
    }

    fn lookup(&self, name: &str) -> Option<NativeFunction> {
        let function = match name {
            "sin" => NativeFunction::unary(f64::sin),
            "cos" => NativeFunction::unary(f64::cos),
            "tan" => NativeFunction::unary(f64::tan),
            "asin" => NativeFunction::unary(f64::asin),
            "acos" => NativeFunction::unary(f64::acos),
            "atan" => NativeFunction::unary(f64::atan),
            "sqrt" => NativeFunction::unary(f64::sqrt),
            "exp" => NativeFunction::unary(f64::exp),
            "log" => NativeFunction::unary(f64::ln),
            "log10" => NativeFunction::unary(f64::log10),
            "fabs" => NativeFunction::unary(f64::abs),
            "floor" => NativeFunction::unary(f64::floor),
            "ceil" => NativeFunction::unary(f64::ceil),
            "atan2" => NativeFunction::binary(f64::atan2),
            "pow" => NativeFunction::binary(f64::powf),
            "hypot" => NativeFunction::binary(f64::hypot),
            _ => return None,
        };
        Some(function)
    }
}

/// Process and environment queries
pub struct OsCapability;

impl Capability for OsCapability {
    fn namespace(&self) -> &'static str {
        "os"
    }

    fn lookup(&self, name: &str) -> Option<NativeFunction> {
        match name {
            "getpid" => Some(NativeFunction::raw(0, os_getpid)),
            "getcwd" => Some(NativeFunction::raw(0, os_getcwd)),
            "getenv" => Some(NativeFunction::raw(1, os_getenv)),
            _ => None,
        }
    }
}

fn os_getpid(_args: &[Value]) -> Result<Value, String> {
    Ok(Value::Int(i64::from(std::process::id())))
}

fn os_getcwd(_args: &[Value]) -> Result<Value, String> {
    let cwd = std::env::current_dir().map_err(|e| e.to_string())?;
    Ok(Value::String(cwd.display().to_string()))
}

/// Unset variables read as the empty string
fn os_getenv(args: &[Value]) -> Result<Value, String> {
    match args.first() {
        Some(Value::String(key)) => Ok(Value::String(std::env::var(key).unwrap_or_default())),
        Some(other) => Err(format!("argument 0 must be a string, got {}", other.type_name())),
        None => Err("missing argument 0".to_string()),
    }
}

/// The capability list a fresh interpreter gets: `math`, then `os`
pub fn default_capabilities() -> Vec<Box<dyn Capability>> {
    vec![Box::new(MathCapability), Box::new(OsCapability)]
}

pub fn capability_by_name(name: &str) -> Option<Box<dyn Capability>> {
    match name {
        "math" => Some(Box::new(MathCapability)),
        "os" => Some(Box::new(OsCapability)),
        _ => None,
    }
}
