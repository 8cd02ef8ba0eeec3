//! PDF attachment extraction from raw RFC 822 messages.

use crate::constants::PDF_EXTENSION;
use crate::error::Result;
use mailparse::{MailHeaderMap, ParsedMail};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfAttachment {
    pub file_name: String,
    pub contents: Vec<u8>,
}

/// Every PDF attachment in the message, in MIME order
pub fn extract_pdf_attachments(raw: &[u8]) -> Result<Vec<PdfAttachment>> {
    let parsed = mailparse::parse_mail(raw)?;
    let mut found = Vec::new();
    collect(&parsed, &mut found)?;
    Ok(found)
}

fn collect(part: &ParsedMail<'_>, found: &mut Vec<PdfAttachment>) -> Result<()> {
    if !part.subparts.is_empty() {
        for sub in &part.subparts {
            collect(sub, found)?;
        }
        return Ok(());
    }

    let Some(file_name) = attachment_name(part) else {
        return Ok(());
    };
    if !is_pdf(&file_name) {
        return Ok(());
    }

    found.push(PdfAttachment {
        file_name,
        contents: part.get_body_raw()?,
    });
    Ok(())
}

fn attachment_name(part: &ParsedMail<'_>) -> Option<String> {
    if part.headers.get_first_value("Content-Disposition").is_none() {
        return None;
    }
    let disposition = part.get_content_disposition();
    disposition
        .params
        .get("filename")
        .or_else(|| part.ctype.params.get("name"))
        .map(|raw| decode_encoded_words(raw))
        .filter(|name| !name.trim().is_empty())
}

/// Decode RFC 2047 encoded words (`=?charset?B?...?=`) in a parameter value
fn decode_encoded_words(raw: &str) -> String {
    if !raw.contains("=?") {
        return raw.to_string();
    }
    let synthetic = format!("X-Name: {raw}");
    match mailparse::parse_header(synthetic.as_bytes()) {
        Ok((header, _)) => header.get_value(),
        Err(_) => raw.to_string(),
    }
}

fn is_pdf(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case(PDF_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIGNED_PDF_B64: &str = "JVBERi0xLjQgYXNzaW5hZG8=";

    fn message(parts: &[String]) -> Vec<u8> {
        let mut body = String::from(
            "From: sign@portal.example\r\n\
             To: contratos@empresa.com\r\n\
             Subject: Contrato assinado 123\r\n\
             MIME-Version: 1.0\r\n\
             Content-Type: multipart/mixed; boundary=\"XYZ\"\r\n\r\n",
        );
        for part in parts {
            body.push_str("--XYZ\r\n");
            body.push_str(part);
            body.push_str("\r\n");
        }
        body.push_str("--XYZ--\r\n");
        body.into_bytes()
    }

    fn pdf_part(disposition_name: &str) -> String {
        format!(
            "Content-Type: application/pdf\r\n\
             Content-Disposition: attachment; filename=\"{disposition_name}\"\r\n\
             Content-Transfer-Encoding: base64\r\n\r\n\
             {SIGNED_PDF_B64}\r\n"
        )
    }

    #[test]
    fn test_extracts_only_pdf_attachments() {
        let raw = message(&[
            "Content-Type: text/plain\r\n\r\nSegue o contrato.\r\n".to_string(),
            pdf_part("contrato_123.PDF"),
            "Content-Type: image/png\r\nContent-Disposition: attachment; filename=\"logo.png\"\r\n\r\nxx\r\n"
                .to_string(),
        ]);

        let attachments = extract_pdf_attachments(&raw).unwrap();

        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].file_name, "contrato_123.PDF");
        assert_eq!(attachments[0].contents, b"%PDF-1.4 assinado");
    }

    #[test]
    fn test_decodes_encoded_file_names() {
        let raw = message(&[pdf_part("=?UTF-8?B?Q29udHJhdG8gQXNzaW5hZG8gw6fDo28ucGRm?=")]);

        let attachments = extract_pdf_attachments(&raw).unwrap();

        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].file_name, "Contrato Assinado ção.pdf");
    }

    #[test]
    fn test_inline_part_without_disposition_is_ignored() {
        let raw = message(&[format!(
            "Content-Type: application/pdf; name=\"inline.pdf\"\r\n\
             Content-Transfer-Encoding: base64\r\n\r\n{SIGNED_PDF_B64}\r\n"
        )]);
        assert!(extract_pdf_attachments(&raw).unwrap().is_empty());
    }

    #[test]
    fn test_pdf_extension_check() {
        assert!(is_pdf("a.pdf"));
        assert!(is_pdf("a.Pdf"));
        assert!(!is_pdf("pdf"));
        assert!(!is_pdf("a.pdf.exe"));
    }
}
