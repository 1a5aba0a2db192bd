//! Read-only access to string values in the Windows registry.
//!
//! Any failure (missing key, missing value, wrong type, access denied) is
//! reported as `None`. On other platforms every lookup misses.

/// Reads string values below `HKEY_LOCAL_MACHINE`.
pub trait RegistryReader: Send + Sync {
    /// Value `value` of subkey `key`, if present and a string.
    fn read_string(&self, key: &str, value: &str) -> Option<String>;
}

/// [`RegistryReader`] backed by the real registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRegistry;

impl RegistryReader for SystemRegistry {
    #[cfg(windows)]
    fn read_string(&self, key: &str, value: &str) -> Option<String> {
        read_hklm_string(key, value)
    }

    #[cfg(not(windows))]
    fn read_string(&self, _key: &str, _value: &str) -> Option<String> {
        None
    }
}

#[cfg(windows)]
fn read_hklm_string(key: &str, value: &str) -> Option<String> {
    use windows::core::HSTRING;
    use windows::Win32::Foundation::ERROR_SUCCESS;
    use windows::Win32::System::Registry::{RegGetValueW, HKEY_LOCAL_MACHINE, RRF_RT_REG_SZ};

    let key = HSTRING::from(key);
    let value = HSTRING::from(value);

    // First call sizes the buffer, second fills it.
    let mut size: u32 = 0;
    // SAFETY: no data pointer is passed, only the size out-parameter.
    let status = unsafe {
        RegGetValueW(
            HKEY_LOCAL_MACHINE,
            &key,
            &value,
            RRF_RT_REG_SZ,
            None,
            None,
            Some(&mut size as *mut u32),
        )
    };
    if status != ERROR_SUCCESS || size == 0 {
        return None;
    }

    let mut buf = vec![0u16; (size as usize).div_ceil(2)];
    // SAFETY: `buf` holds at least `size` bytes and outlives the call.
    let status = unsafe {
        RegGetValueW(
            HKEY_LOCAL_MACHINE,
            &key,
            &value,
            RRF_RT_REG_SZ,
            None,
            Some(buf.as_mut_ptr().cast()),
            Some(&mut size as *mut u32),
        )
    };
    if status != ERROR_SUCCESS {
        return None;
    }

    let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    Some(String::from_utf16_lossy(&buf[..len]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(windows))]
    #[test]
    fn test_lookups_miss_off_windows() {
        let registry = SystemRegistry;
        assert_eq!(
            registry.read_string(r"SOFTWARE\ImageMagick\Current", "BinPath"),
            None
        );
    }

    #[cfg(windows)]
    #[test]
    fn test_missing_key_is_none() {
        let registry = SystemRegistry;
        assert_eq!(
            registry.read_string(r"SOFTWARE\toolforged\does-not-exist", "BinPath"),
            None
        );
    }
}
