use std::mem::MaybeUninit;

/// Host-native string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostString {
    /// Shared string owned by the host for the whole process.
    Interned(&'static [u8]),
    Owned {
        bytes: Box<[u8]>,
        /// Allocated with the persistent allocator rather than the
        /// per-request one.
        persistent: bool,
    },
}

impl HostString {
    pub const EMPTY: HostString = HostString::Interned(b"");

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            HostString::Interned(bytes) => bytes,
            HostString::Owned { bytes, .. } => bytes,
        }
    }

    pub fn is_interned(&self) -> bool {
        matches!(self, HostString::Interned(_))
    }

    pub fn is_persistent(&self) -> bool {
        match self {
            HostString::Interned(_) => true,
            HostString::Owned { persistent, .. } => *persistent,
        }
    }
}

/// A value slot as the host stores it.
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Undef,
    Null,
    Bool(bool),
    Long(i64),
    Double(f64),
    String(HostString),
}

impl HostValue {
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            HostValue::String(s) => Some(s.as_bytes()),
            _ => None,
        }
    }
}

/// Writes `bytes` into `dest` as a host string and returns the initialized
/// value.
///
/// `dest` must not hold a live value: whatever it contains is overwritten
/// without being dropped. Empty input uses the interned empty string.
pub fn copy_bytes_into_host_string<'d>(
    dest: &'d mut MaybeUninit<HostValue>,
    bytes: &[u8],
    persistent: bool,
) -> &'d mut HostValue {
    let string = if bytes.is_empty() {
        HostString::EMPTY
    } else {
        HostString::Owned {
            bytes: bytes.into(),
            persistent,
        }
    };
    dest.write(HostValue::String(string))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_interned() {
        let mut slot = MaybeUninit::uninit();
        let value = copy_bytes_into_host_string(&mut slot, b"", false);
        assert_eq!(*value, HostValue::String(HostString::EMPTY));
        let HostValue::String(s) = value else {
            panic!("expected a string");
        };
        assert!(s.is_interned());
    }

    #[test]
    fn bytes_are_copied_with_allocator_class() {
        let source = b"gc_collect_cycles\xff".to_vec();
        let mut slot = MaybeUninit::uninit();
        let value = copy_bytes_into_host_string(&mut slot, &source, true).clone();
        drop(source);

        assert_eq!(value.as_bytes(), Some(&b"gc_collect_cycles\xff"[..]));
        let HostValue::String(s) = value else {
            panic!("expected a string");
        };
        assert!(!s.is_interned());
        assert!(s.is_persistent());

        let mut slot = MaybeUninit::uninit();
        let value = copy_bytes_into_host_string(&mut slot, b"x", false);
        let HostValue::String(s) = value else {
            panic!("expected a string");
        };
        assert!(!s.is_persistent());
    }
}
