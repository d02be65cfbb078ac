//! Bounds-checked access to the raw file bytes.
//!
//! Every structure is located by an `(offset, size)` pair taken from the file
//! itself. [`region`] validates such a pair against the byte view before any
//! field is read, and [`Endian`] decodes fields from slices whose length has
//! already been checked.

use crate::error::ElfError;

/// Byte order of multi-byte fields, taken from `e_ident[EI_DATA]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Endian {
    /// `ELFDATA2LSB`, and the fallback for unknown encodings.
    #[default]
    Little,
    /// `ELFDATA2MSB`.
    Big,
}

impl Endian {
    /// Read a `u16` from `data` at byte offset `off`.
    ///
    /// # Panics
    ///
    /// Panics if `off + 2 > data.len()`. Callers must bounds-check first.
    pub(crate) fn u16(self, data: &[u8], off: usize) -> u16 {
        let b = array::<2>(data, off);
        match self {
            Self::Little => u16::from_le_bytes(b),
            Self::Big => u16::from_be_bytes(b),
        }
    }

    /// Read a `u32` from `data` at byte offset `off`.
    pub(crate) fn u32(self, data: &[u8], off: usize) -> u32 {
        let b = array::<4>(data, off);
        match self {
            Self::Little => u32::from_le_bytes(b),
            Self::Big => u32::from_be_bytes(b),
        }
    }

    /// Read a `u64` from `data` at byte offset `off`.
    pub(crate) fn u64(self, data: &[u8], off: usize) -> u64 {
        let b = array::<8>(data, off);
        match self {
            Self::Little => u64::from_le_bytes(b),
            Self::Big => u64::from_be_bytes(b),
        }
    }
}

fn array<const N: usize>(data: &[u8], off: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&data[off..off + N]);
    out
}

/// Returns `data[offset..offset + len]`, or [`ElfError::Truncated`] if the
/// range does not lie entirely inside `data`.
pub(crate) fn region<'a>(
    data: &'a [u8],
    offset: u64,
    len: u64,
    what: &'static str,
) -> Result<&'a [u8], ElfError> {
    let end = offset
        .checked_add(len)
        .filter(|&end| end <= data.len() as u64)
        .ok_or(ElfError::Truncated { what, offset, len })?;
    #[expect(
        clippy::cast_possible_truncation,
        reason = "end <= data.len() was checked above"
    )]
    let range = offset as usize..end as usize;
    Ok(&data[range])
}

/// Locate a table of `count` fixed-size entries spaced `stride` bytes apart.
///
/// The returned slice covers the whole table; entry `i` starts at
/// `i * stride` within it.
pub(crate) fn table<'a>(
    data: &'a [u8],
    offset: u64,
    count: u64,
    stride: u64,
    what: &'static str,
) -> Result<&'a [u8], ElfError> {
    let len = count.checked_mul(stride).ok_or(ElfError::Truncated {
        what,
        offset,
        len: u64::MAX,
    })?;
    region(data, offset, len, what)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endian_decoding() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        assert_eq!(Endian::Little.u16(&data, 0), 0x0201);
        assert_eq!(Endian::Big.u16(&data, 0), 0x0102);
        assert_eq!(Endian::Little.u32(&data, 4), 0x0807_0605);
        assert_eq!(Endian::Big.u32(&data, 4), 0x0506_0708);
        assert_eq!(Endian::Little.u64(&data, 0), 0x0807_0605_0403_0201);
        assert_eq!(Endian::Big.u64(&data, 0), 0x0102_0304_0506_0708);
    }

    #[test]
    fn region_in_bounds() {
        let data = [0u8, 1, 2, 3, 4, 5];
        assert_eq!(region(&data, 2, 3, "test").unwrap(), &[2, 3, 4]);
        assert_eq!(region(&data, 6, 0, "test").unwrap(), &[] as &[u8]);
    }

    #[test]
    fn region_out_of_bounds() {
        let data = [0u8; 6];
        assert!(matches!(
            region(&data, 4, 3, "blob"),
            Err(ElfError::Truncated {
                what: "blob",
                offset: 4,
                len: 3
            })
        ));
    }

    #[test]
    fn region_offset_overflow() {
        let data = [0u8; 6];
        assert!(matches!(
            region(&data, u64::MAX, 2, "blob"),
            Err(ElfError::Truncated { .. })
        ));
    }

    #[test]
    fn table_size_overflow() {
        let data = [0u8; 64];
        assert!(matches!(
            table(&data, 0, u64::MAX, 64, "table"),
            Err(ElfError::Truncated { .. })
        ));
    }

    /// Slices handed out by `region` and `table` borrow from the input
    /// data, not from the label.
    fn second_entry<'a>(data: &'a [u8], label: &'static str) -> &'a [u8] {
        let entries = table(data, 2, 2, 3, label).unwrap();
        region(entries, 3, 3, label).unwrap()
    }

    #[test]
    fn slices_borrow_from_data() {
        let data: Vec<u8> = (0..10).collect();
        let entry = second_entry(&data, "entries");
        assert_eq!(entry, &[5, 6, 7]);
    }
}
