pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Load a typed input document from `--input <path>` or, failing that, from
/// piped stdin. `Ok(None)` means neither was supplied.
pub fn read_document<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return file::read_json(path).map(Some);
    }
    stdin::read_stdin()
}
