use std::fs;
use std::io;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::str::Utf8Error;

use elsa::FrozenVec;
use serde::Serialize;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(NonZeroUsize);

/// Backing storage for loaded files.
///
/// Buffers are append-only, so references into already-loaded files stay
/// valid while further files are loaded during a tree walk.
#[derive(Default)]
pub struct SourceBuffer(FrozenVec<Vec<u8>>);

impl SourceBuffer {
    pub fn new() -> Self {
        Self(FrozenVec::new())
    }
}

pub struct SourceMap<'buf> {
    buf: &'buf SourceBuffer,
    files: Vec<SourceFile<'buf>>,
}

#[derive(Debug)]
pub struct SourceFile<'buf> {
    path: PathBuf,
    buf: &'buf [u8],
}

impl<'buf> SourceMap<'buf> {
    pub fn new(buf: &'buf mut SourceBuffer) -> Self {
        // take a &mut to ensure exclusivity of the borrow

        Self {
            buf: &*buf,
            files: Vec::new(),
        }
    }

    pub fn add(&mut self, path: PathBuf, contents: Vec<u8>) -> SourceId {
        let idx = self.files.len();
        assert_eq!(self.buf.0.len(), idx);
        let id = SourceId((idx + 1).try_into().unwrap());

        self.buf.0.push(contents);
        let buf: &'buf [u8] = &self.buf.0[idx];

        self.files.push(SourceFile { path, buf });

        id
    }

    pub fn load(&mut self, path: &Path) -> io::Result<SourceId> {
        let contents = fs::read(path)?;

        Ok(self.add(path.to_owned(), contents))
    }

    pub fn get(&self, id: SourceId) -> Option<&SourceFile<'buf>> {
        self.files.get(usize::from(id.0) - 1)
    }
}

impl<'buf> SourceFile<'buf> {
    pub fn buf(&self) -> &'buf [u8] {
        self.buf
    }

    pub fn text(&self) -> Result<&'buf str, Utf8Error> {
        std::str::from_utf8(self.buf)
    }

    /// The module name: the file name without the `.py` suffix.
    pub fn module_name(&self) -> String {
        let name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();

        name.strip_suffix(".py").unwrap_or(&name).to_owned()
    }
}
