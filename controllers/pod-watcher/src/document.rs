//! YAML rendering of pods and the document stream.

use std::io::Write;

use k8s_openapi::api::core::v1::Pod;

use crate::error::ControllerError;

/// Renders a pod as YAML.
///
/// The same text is used to test for the marker and to write the document,
/// so structural field names are part of what the marker can match.
pub fn render(pod: &Pod) -> Result<String, ControllerError> {
    Ok(serde_yaml::to_string(pod)?)
}

/// Writes one `---` separated document and flushes it.
pub fn write_document<W: Write>(out: &mut W, yaml: &str) -> Result<(), ControllerError> {
    write!(out, "---\n{yaml}\n")?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::pod;

    #[test]
    fn test_render_includes_type_meta_and_metadata() {
        let yaml = render(&pod("default", "web-0", "nginx")).expect("pod renders");

        assert!(yaml.contains("apiVersion: v1"));
        assert!(yaml.contains("kind: Pod"));
        assert!(yaml.contains("name: web-0"));
        assert!(yaml.contains("namespace: default"));
    }

    #[test]
    fn test_write_document_framing() {
        let mut out = Vec::new();
        write_document(&mut out, "a: 1\n").expect("write to vec");
        write_document(&mut out, "b: 2\n").expect("write to vec");

        assert_eq!(String::from_utf8(out).expect("utf8"), "---\na: 1\n\n---\nb: 2\n\n");
    }
}
