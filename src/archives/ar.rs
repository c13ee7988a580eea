// {{{ Copyright (c) Paul R. Tagliamonte <paultag@debian.org>, 2024
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN
// THE SOFTWARE. }}}

/// Global header of an `ar` archive.
pub const AR_MAGIC: &[u8; 8] = b"!<arch>\n";

/// Size of one member header.
pub const AR_HEADER_SIZE: usize = 60;

const AR_FMAG: &[u8; 2] = b"`\n";

/// One decoded `ar` member header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArMemberHeader {
    /// Member name, trailing padding and the GNU `/` terminator
    /// stripped.
    pub name: String,

    /// Modification time, seconds since the epoch.
    pub mtime: u64,

    /// Owner uid.
    pub uid: u32,

    /// Owner gid.
    pub gid: u32,

    /// Mode bits (the header field is octal).
    pub mode: u32,

    /// Member data size in bytes.
    pub size: u64,
}

/// Error conditions which may be encountered decoding an `ar` member
/// header.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArError {
    /// The two magic bytes ending the header are wrong.
    BadMagic,

    /// The member name is empty or not ASCII.
    BadName,

    /// A numeric field holds something other than digits and
    /// padding, or overflows its width.
    BadNumber,
}
crate::errors::error_enum!(ArError);

fn field(block: &[u8], start: usize, len: usize) -> &[u8] {
    &block[start..start + len]
}

fn parse_num(field: &[u8], radix: u32) -> Result<u64, ArError> {
    let text = std::str::from_utf8(field)
        .map_err(|_| ArError::BadNumber)?
        .trim_end_matches(' ');
    if text.is_empty() {
        return Ok(0);
    }
    u64::from_str_radix(text, radix).map_err(|_| ArError::BadNumber)
}

fn parse_num_u32(field: &[u8], radix: u32) -> Result<u32, ArError> {
    u32::try_from(parse_num(field, radix)?).map_err(|_| ArError::BadNumber)
}

/// Decode one 60-byte `ar` member header.
pub fn parse_ar_header(block: &[u8; AR_HEADER_SIZE]) -> Result<ArMemberHeader, ArError> {
    if field(block, 58, 2) != AR_FMAG {
        return Err(ArError::BadMagic);
    }

    let name = std::str::from_utf8(field(block, 0, 16)).map_err(|_| ArError::BadName)?;
    // Trailing space padding, then the GNU-style '/' terminator.
    let name = name.trim_end_matches(' ').trim_end_matches('/');
    if name.is_empty() {
        return Err(ArError::BadName);
    }

    Ok(ArMemberHeader {
        name: name.to_owned(),
        mtime: parse_num(field(block, 16, 12), 10)?,
        uid: parse_num_u32(field(block, 28, 6), 10)?,
        gid: parse_num_u32(field(block, 34, 6), 10)?,
        mode: parse_num_u32(field(block, 40, 8), 8)?,
        size: parse_num(field(block, 48, 10), 10)?,
    })
}


// vim: foldmethod=marker
