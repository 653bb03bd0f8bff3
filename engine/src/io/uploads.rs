//! Uploaded files made available to file-typed action parameters.

/// One uploaded file, keyed by the form field it arrived under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub field: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(field: impl Into<String>, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            field: field.into(),
            file_name: file_name.into(),
            content_type: None,
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Read-only lookup of uploads by form field name.
pub trait UploadStore {
    /// First upload submitted under `field`.
    fn file(&self, field: &str) -> Option<UploadedFile>;
    /// Every upload submitted under `field`, in submission order.
    fn files(&self, field: &str) -> Vec<UploadedFile>;
}

/// In-memory upload store, in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileCollection {
    files: Vec<UploadedFile>,
}

impl FileCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, file: UploadedFile) {
        self.files.push(file);
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FromIterator<UploadedFile> for FileCollection {
    fn from_iter<T: IntoIterator<Item = UploadedFile>>(iter: T) -> Self {
        Self {
            files: iter.into_iter().collect(),
        }
    }
}

impl UploadStore for FileCollection {
    fn file(&self, field: &str) -> Option<UploadedFile> {
        self.files.iter().find(|file| file.field == field).cloned()
    }

    fn files(&self, field: &str) -> Vec<UploadedFile> {
        self.files
            .iter()
            .filter(|file| file.field == field)
            .cloned()
            .collect()
    }
}
