//! Handing finished artifacts to the host environment.
//!
//! The studio never writes files or opens windows itself. It encodes PNG
//! bytes and passes them to an [`ExportHost`], which decides what a download
//! or a print surface means where the crate is embedded. A host that
//! declines (a blocked popup, a read-only directory) returns an error and
//! the export is not retried.

use std::path::{Path, PathBuf};

use crate::error::HostError;

/// Receives exported artifacts.
pub trait ExportHost {
    /// Offers `bytes` to the user as a file called `filename`.
    fn save_file(&mut self, filename: &str, bytes: &[u8]) -> Result<(), HostError>;

    /// Presents a print-ready page showing the PNG image `png`.
    fn open_print_surface(&mut self, title: &str, png: &[u8]) -> Result<(), HostError>;
}

// ============================================================================
// DirectoryHost
// ============================================================================

/// File name stem of the print sheet written by [`DirectoryHost`].
const PRINT_STEM: &str = "print-sheet";

/// Writes exports into a directory.
///
/// Downloads become files under the directory. A print surface becomes
/// `print-sheet.png` plus `print-sheet.html`, a page that shows the sheet
/// and opens the browser's print dialog once the image has loaded.
#[derive(Debug, Clone)]
pub struct DirectoryHost {
    dir: PathBuf,
}

impl DirectoryHost {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the HTML page written by the last print request.
    pub fn print_page_path(&self) -> PathBuf {
        self.dir.join(format!("{}.html", PRINT_STEM))
    }

    fn target(&self, filename: &str) -> Result<PathBuf, HostError> {
        let name = Path::new(filename);
        let is_plain = name.file_name().is_some_and(|f| f == name.as_os_str());
        if filename.is_empty() || !is_plain {
            return Err(HostError::Refused(format!("'{}' is not a plain file name", filename)));
        }
        std::fs::create_dir_all(&self.dir)?;
        Ok(self.dir.join(name))
    }
}

impl ExportHost for DirectoryHost {
    fn save_file(&mut self, filename: &str, bytes: &[u8]) -> Result<(), HostError> {
        let path = self.target(filename)?;
        std::fs::write(&path, bytes)?;
        log::debug!("Saved {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    fn open_print_surface(&mut self, title: &str, png: &[u8]) -> Result<(), HostError> {
        let image_name = format!("{}.png", PRINT_STEM);
        std::fs::write(self.target(&image_name)?, png)?;

        let page = self.target(&format!("{}.html", PRINT_STEM))?;
        std::fs::write(&page, print_page(title, &image_name))?;
        log::debug!("Print page written to {}", page.display());
        Ok(())
    }
}

/// A white page showing `image` full width that prints itself on load.
fn print_page(title: &str, image: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8"/>
    <title>{title}</title>
    <style>
      html,body{{margin:0;height:100%;background:#ffffff}}
      img{{background:#ffffff;display:block;width:100%;height:auto;object-fit:contain}}
    </style>
  </head>
  <body>
    <img id="sheet" src="{image}" alt="{title}"/>
    <script>
      (function(){{
        var img = document.getElementById('sheet');
        function doPrint(){{ try {{ window.focus(); window.print(); }} catch (e) {{}} }}
        if (img.complete && img.naturalWidth !== 0) {{ setTimeout(doPrint, 60); }}
        else {{
          img.addEventListener('load', function(){{ setTimeout(doPrint, 60); }});
          img.addEventListener('error', function(){{ setTimeout(doPrint, 120); }});
        }}
      }})();
    </script>
  </body>
</html>
"#,
        title = escape_html(title),
        image = escape_html(image),
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn saves_file_into_directory() {
        let dir = tempdir().unwrap();
        let mut host = DirectoryHost::new(dir.path().join("out"));

        host.save_file("sticker.png", b"png").unwrap();

        assert_eq!(fs::read(dir.path().join("out/sticker.png")).unwrap(), b"png");
    }

    #[test]
    fn refuses_paths_outside_directory() {
        let dir = tempdir().unwrap();
        let mut host = DirectoryHost::new(dir.path());

        for name in ["../escape.png", "nested/file.png", "", ".."] {
            assert!(
                matches!(host.save_file(name, b"x"), Err(HostError::Refused(_))),
                "{name:?} should be refused"
            );
        }
    }

    #[test]
    fn print_surface_writes_image_and_page() {
        let dir = tempdir().unwrap();
        let mut host = DirectoryHost::new(dir.path());

        host.open_print_surface("A4 <sheet>", b"png").unwrap();

        assert_eq!(fs::read(dir.path().join("print-sheet.png")).unwrap(), b"png");
        let html = fs::read_to_string(host.print_page_path()).unwrap();
        assert!(html.contains("<title>A4 &lt;sheet&gt;</title>"));
        assert!(html.contains(r#"src="print-sheet.png""#));
        assert!(html.contains("window.print()"));
    }
}
