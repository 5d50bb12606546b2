// stream.rs - YR_STREAM adapters over std::io readers and writers.
//
// libyara calls back with (size, count) element requests; the first I/O
// error is kept and every later call reports zero elements.

use std::ffi::c_void;
use std::io::{self, Read, Write};

use crate::ffi::YR_STREAM;

pub(crate) struct ReadStream<'r> {
    reader: &'r mut dyn Read,
    result: io::Result<()>,
}

impl<'r> ReadStream<'r> {
    pub(crate) fn new(reader: &'r mut dyn Read) -> Self {
        ReadStream {
            reader,
            result: Ok(()),
        }
    }

    /// The returned stream points into `self`, which must not move while
    /// libyara uses it.
    pub(crate) fn as_yara(&mut self) -> YR_STREAM {
        YR_STREAM {
            user_data: self as *mut ReadStream as *mut c_void,
            read: Some(stream_read),
            write: None,
        }
    }

    pub(crate) fn result(self) -> io::Result<()> {
        self.result
    }
}

pub(crate) struct WriteStream<'w> {
    writer: &'w mut dyn Write,
    result: io::Result<()>,
}

impl<'w> WriteStream<'w> {
    pub(crate) fn new(writer: &'w mut dyn Write) -> Self {
        WriteStream {
            writer,
            result: Ok(()),
        }
    }

    pub(crate) fn as_yara(&mut self) -> YR_STREAM {
        YR_STREAM {
            user_data: self as *mut WriteStream as *mut c_void,
            read: None,
            write: Some(stream_write),
        }
    }

    pub(crate) fn result(self) -> io::Result<()> {
        self.result.and_then(|()| self.writer.flush())
    }
}

/// Fill `buf` as far as the reader allows; short only at end of input.
fn read_full(reader: &mut dyn Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

unsafe extern "C" fn stream_read(
    ptr: *mut c_void,
    size: usize,
    count: usize,
    user_data: *mut c_void,
) -> usize {
    let this = &mut *(user_data as *mut ReadStream);
    if this.result.is_err() || size == 0 || count == 0 {
        return 0;
    }
    let Some(len) = size.checked_mul(count) else {
        return 0;
    };

    let buf = std::slice::from_raw_parts_mut(ptr as *mut u8, len);
    match read_full(this.reader, buf) {
        Ok(n) => n / size,
        Err(e) => {
            this.result = Err(e);
            0
        }
    }
}

unsafe extern "C" fn stream_write(
    ptr: *const c_void,
    size: usize,
    count: usize,
    user_data: *mut c_void,
) -> usize {
    let this = &mut *(user_data as *mut WriteStream);
    if this.result.is_err() {
        return 0;
    }
    let Some(len) = size.checked_mul(count) else {
        return 0;
    };
    if len == 0 {
        return count;
    }

    let buf = std::slice::from_raw_parts(ptr as *const u8, len);
    match this.writer.write_all(buf) {
        Ok(()) => count,
        Err(e) => {
            this.result = Err(e);
            0
        }
    }
}
