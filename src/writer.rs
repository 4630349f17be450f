/*!
 * XML writer implementation for project-context
 */

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::types::{CollectedFile, ProjectContext, ProjectInfo, ProjectMetadata};
use crate::utils::escape_xml;

/// XML writer for the assembled project context
pub struct XmlWriter {
    /// Destination file
    output_file: PathBuf,
}

impl XmlWriter {
    /// Create a new XML writer targeting `output_file`
    pub fn new(output_file: impl Into<PathBuf>) -> Self {
        Self {
            output_file: output_file.into(),
        }
    }

    /// Destination file
    pub fn output_file(&self) -> &Path {
        &self.output_file
    }

    /// Write the document to the output file
    pub fn write(&self, context: &ProjectContext) -> io::Result<()> {
        let file = File::create(&self.output_file)?;
        let mut out = self.write_to(context, BufWriter::new(file))?;
        out.flush()
    }

    /// Write the document to any writer, returning it afterwards
    pub fn write_to<W: Write>(&self, context: &ProjectContext, out: W) -> io::Result<W> {
        let mut xml_writer = Writer::new_with_indent(out, b' ', 2);

        // Write XML declaration
        xml_writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut start_tag = BytesStart::new("projectContext");
        let timestamp = Local::now().to_rfc3339();
        start_tag.push_attribute(("generated", timestamp.as_str()));
        xml_writer.write_event(Event::Start(start_tag))?;

        self.write_project_info(&context.info, &mut xml_writer)?;

        xml_writer.write_event(Event::Start(BytesStart::new("fileTree")))?;
        write_cdata(&format!("\n{}", context.tree), &mut xml_writer)?;
        xml_writer.write_event(Event::End(BytesEnd::new("fileTree")))?;

        xml_writer.write_event(Event::Start(BytesStart::new("fileContents")))?;
        for file in &context.files {
            self.write_file(file, &mut xml_writer)?;
        }
        xml_writer.write_event(Event::End(BytesEnd::new("fileContents")))?;

        xml_writer.write_event(Event::End(BytesEnd::new("projectContext")))?;

        Ok(xml_writer.into_inner())
    }

    /// Write the project metadata block
    fn write_project_info<W: Write>(&self, info: &ProjectInfo, writer: &mut Writer<W>) -> io::Result<()> {
        writer.write_event(Event::Start(BytesStart::new("projectInfo")))?;

        match info {
            ProjectInfo::Found(metadata) => self.write_metadata(metadata, writer)?,
            ProjectInfo::Missing => {
                write_text_element("warning", "No project manifest found", writer)?
            }
            ProjectInfo::Unreadable { manifest, .. } => {
                write_text_element("error", &format!("Unable to read {}", manifest), writer)?
            }
        }

        writer.write_event(Event::End(BytesEnd::new("projectInfo")))?;

        Ok(())
    }

    fn write_metadata<W: Write>(&self, metadata: &ProjectMetadata, writer: &mut Writer<W>) -> io::Result<()> {
        let fields = [
            ("name", &metadata.name),
            ("description", &metadata.description),
            ("version", &metadata.version),
        ];
        for (tag, value) in fields {
            if let Some(value) = value {
                write_text_element(tag, value, writer)?;
            }
        }

        if !metadata.dependencies.is_empty() {
            writer.write_event(Event::Start(BytesStart::new("dependencies")))?;
            for dependency in &metadata.dependencies {
                writer.write_event(Event::Start(BytesStart::new("dependency")))?;
                write_text_element("name", &dependency.name, writer)?;
                write_text_element("version", &dependency.version, writer)?;
                writer.write_event(Event::End(BytesEnd::new("dependency")))?;
            }
            writer.write_event(Event::End(BytesEnd::new("dependencies")))?;
        }

        Ok(())
    }

    /// Write a collected file
    fn write_file<W: Write>(&self, file: &CollectedFile, writer: &mut Writer<W>) -> io::Result<()> {
        writer.write_event(Event::Start(BytesStart::new("file")))?;

        write_text_element("path", &file.path, writer)?;

        writer.write_event(Event::Start(BytesStart::new("content")))?;
        write_cdata(&file.content, writer)?;
        writer.write_event(Event::End(BytesEnd::new("content")))?;

        writer.write_event(Event::End(BytesEnd::new("file")))?;

        Ok(())
    }
}

/// Write `<tag>escaped text</tag>`
fn write_text_element<W: Write>(tag: &str, text: &str, writer: &mut Writer<W>) -> io::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::from_escaped(escape_xml(text))))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

/// Write text as one or more adjacent CDATA sections
fn write_cdata<W: Write>(text: &str, writer: &mut Writer<W>) -> io::Result<()> {
    for section in cdata_sections(text) {
        writer.write_event(Event::CData(BytesCData::new(section)))?;
    }
    Ok(())
}

/// Split text so no piece contains the `]]>` terminator.
///
/// Each cut lands between `]]` and `>`; concatenating the pieces gives back
/// the original text.
fn cdata_sections(text: &str) -> Vec<&str> {
    let mut sections = Vec::new();
    let mut rest = text;

    while let Some(pos) = rest.find("]]>") {
        sections.push(&rest[..pos + 2]);
        rest = &rest[pos + 2..];
    }
    sections.push(rest);

    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Dependency;
    use quick_xml::events::Event;
    use quick_xml::Reader;

    fn context(info: ProjectInfo, files: Vec<CollectedFile>) -> ProjectContext {
        ProjectContext {
            info,
            tree: "├── a.ts\n└── src/\n".to_string(),
            files,
        }
    }

    fn render(context: &ProjectContext) -> String {
        let bytes = XmlWriter::new("unused.xml").write_to(context, Vec::new()).unwrap();
        String::from_utf8(bytes).unwrap()
    }

    /// Collect the text and CDATA found under each element name
    fn texts_of(xml: &str, tag: &str) -> Vec<String> {
        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<String> = Vec::new();
        let mut found = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    stack.push(String::from_utf8_lossy(e.name().as_ref()).into_owned());
                    if stack.last().map(String::as_str) == Some(tag) {
                        found.push(String::new());
                    }
                }
                Ok(Event::End(_)) => {
                    stack.pop();
                }
                Ok(Event::Text(e)) if stack.last().map(String::as_str) == Some(tag) => {
                    let text = e.unescape().unwrap().into_owned();
                    if let Some(last) = found.last_mut() {
                        last.push_str(&text);
                    }
                }
                Ok(Event::CData(e)) if stack.last().map(String::as_str) == Some(tag) => {
                    let text = String::from_utf8(e.into_inner().into_owned()).unwrap();
                    if let Some(last) = found.last_mut() {
                        last.push_str(&text);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => panic!("Error parsing XML: {}", e),
                _ => (),
            }
        }

        found
    }

    #[test]
    fn test_metadata_is_escaped() {
        let metadata = ProjectMetadata {
            manifest: "package.json".into(),
            name: Some(r#"<app> & "co""#.into()),
            description: None,
            version: Some("1.0.0".into()),
            dependencies: vec![Dependency {
                name: "left-pad".into(),
                version: "^1.0 <2".into(),
            }],
        };

        let xml = render(&context(ProjectInfo::Found(metadata), vec![]));

        assert!(xml.contains("&lt;app&gt; &amp; &quot;co&quot;"));
        assert!(!xml.contains("<description>"));
        assert_eq!(texts_of(&xml, "name"), vec![r#"<app> & "co""#, "left-pad"]);
        assert_eq!(texts_of(&xml, "version"), vec!["1.0.0", "^1.0 <2"]);
    }

    #[test]
    fn test_placeholder_blocks() {
        let xml = render(&context(ProjectInfo::Missing, vec![]));
        assert_eq!(texts_of(&xml, "warning"), vec!["No project manifest found"]);

        let xml = render(&context(
            ProjectInfo::Unreadable {
                manifest: "package.json".into(),
                reason: "bad".into(),
            },
            vec![],
        ));
        assert_eq!(texts_of(&xml, "error"), vec!["Unable to read package.json"]);
    }

    #[test]
    fn test_tree_and_contents() {
        let files = vec![CollectedFile {
            path: "src/a&b.ts".into(),
            content: "if (a < b && c) { x = y[z[0]]>1 }".into(),
            lines: 1,
            chars: 34,
        }];
        let xml = render(&context(ProjectInfo::Missing, files));

        assert_eq!(texts_of(&xml, "fileTree"), vec!["\n├── a.ts\n└── src/\n"]);
        assert_eq!(texts_of(&xml, "path"), vec!["src/a&b.ts"]);
        assert_eq!(
            texts_of(&xml, "content"),
            vec!["if (a < b && c) { x = y[z[0]]>1 }"]
        );
    }

    #[test]
    fn test_cdata_sections() {
        assert_eq!(cdata_sections("plain"), vec!["plain"]);
        assert_eq!(cdata_sections("a]]>b]]>"), vec!["a]]", ">b]]", ">"]);
        assert_eq!(cdata_sections("a]]>b").concat(), "a]]>b");
    }
}
