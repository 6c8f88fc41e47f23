use crate::value::HostValue;

/// Arguments of one host call.
///
/// Arguments up to the function's declared parameter count live in `params`;
/// anything passed beyond that lives in `extra`.
#[derive(Debug, Clone, PartialEq)]
pub struct CallFrame {
    function: Vec<u8>,
    num_args: u32,
    params: Vec<HostValue>,
    extra: Vec<HostValue>,
}

impl CallFrame {
    /// Builds a frame for a call of `function` (declaring `declared` parameters)
    /// with `args`.
    pub fn new(function: impl Into<Vec<u8>>, declared: u32, mut args: Vec<HostValue>) -> Self {
        let num_args = arg_count(args.len());
        let split = args.len().min(declared as usize);
        let extra = args.split_off(split);
        Self {
            function: function.into(),
            num_args,
            params: args,
            extra,
        }
    }

    /// Builds a frame from its parts without checking that they agree.
    pub fn from_parts(
        function: impl Into<Vec<u8>>,
        num_args: u32,
        params: Vec<HostValue>,
        extra: Vec<HostValue>,
    ) -> Self {
        Self {
            function: function.into(),
            num_args,
            params,
            extra,
        }
    }

    pub fn function(&self) -> &[u8] {
        &self.function
    }

    pub fn num_args(&self) -> u32 {
        self.num_args
    }
}

// Frames never hold more than u32::MAX arguments; saturate rather than wrap.
fn arg_count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

/// Argument `n` (zero-based) of `frame`, or `None` if `n` is out of range or
/// the frame does not hold it.
pub fn get_call_argument(frame: &CallFrame, n: u32) -> Option<&HostValue> {
    if n >= frame.num_args {
        return None;
    }
    let n = n as usize;
    let declared = frame.params.len();
    if n < declared {
        frame.params.get(n)
    } else {
        frame.extra.get(n - declared)
    }
}
