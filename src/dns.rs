//! DNS domain parser.
//!
//! Extracts the first question's QNAME from a raw DNS message. Ported from
//! the source's label-walking loop: no pointer compression support (it
//! never appears in a question section), but every read is bounds-checked
//! so a malformed buffer yields [`Error::Parse`] instead of a panic.

use crate::error::Error;

const HEADER_LEN: usize = 12;

/// The fixed-size DNS header fields relevant to logging and parsing.
#[derive(Debug, Clone, Copy)]
pub struct Header {
    pub id: u16,
    pub flags: u16,
    pub qdcount: u16,
    pub ancount: u16,
    pub nscount: u16,
    pub arcount: u16,
}

fn parse_header(data: &[u8]) -> Result<Header, Error> {
    if data.len() < HEADER_LEN {
        return Err(Error::Parse("query too short".into()));
    }
    Ok(Header {
        id: u16::from_be_bytes([data[0], data[1]]),
        flags: u16::from_be_bytes([data[2], data[3]]),
        qdcount: u16::from_be_bytes([data[4], data[5]]),
        ancount: u16::from_be_bytes([data[6], data[7]]),
        nscount: u16::from_be_bytes([data[8], data[9]]),
        arcount: u16::from_be_bytes([data[10], data[11]]),
    })
}

/// The first question section entry.
#[derive(Debug, Clone)]
pub struct Question {
    pub domain: String,
    pub qtype: u16,
    pub qclass: u16,
}

/// Parse a DNS message and return its header plus the first question.
///
/// Walks labels starting at offset 12: each label is a 1-byte length
/// followed by that many bytes, terminated by a zero-length label. A
/// nonzero top-bit length byte (which would indicate pointer compression)
/// is treated as a literal label length, matching the source; this is
/// only safe because every subsequent read is bounds-checked here.
pub fn parse_question(data: &[u8]) -> Result<(Header, Question), Error> {
    let header = parse_header(data)?;
    if header.qdcount == 0 {
        return Err(Error::Parse("no question".into()));
    }

    let mut pos = HEADER_LEN;
    let mut labels = Vec::new();

    loop {
        let len_byte = *data
            .get(pos)
            .ok_or_else(|| Error::Parse("truncated label".into()))?;
        if len_byte == 0 {
            pos += 1;
            break;
        }
        let label_len = len_byte as usize;
        let start = pos + 1;
        let end = start + label_len;
        let label_bytes = data
            .get(start..end)
            .ok_or_else(|| Error::Parse("truncated label".into()))?;
        let label =
            std::str::from_utf8(label_bytes).map_err(|_| Error::Parse("non-ASCII label".into()))?;
        labels.push(label.to_string());
        pos = end;
    }

    let tail = data
        .get(pos..pos + 4)
        .ok_or_else(|| Error::Parse("truncated question tail".into()))?;
    let qtype = u16::from_be_bytes([tail[0], tail[1]]);
    let qclass = u16::from_be_bytes([tail[2], tail[3]]);

    let question = Question {
        domain: labels.join("."),
        qtype,
        qclass,
    };

    if header.ancount > 0 || header.nscount > 0 || header.arcount > 0 {
        tracing::debug!(
            id = %format!("0x{:04x}", header.id),
            flags = %format!("0x{:04x}", header.flags),
            qdcount = header.qdcount,
            ancount = header.ancount,
            nscount = header.nscount,
            arcount = header.arcount,
            domain = %question.domain,
            qtype = question.qtype,
            qclass = question.qclass,
            "parsed question with additional records present"
        );
    }

    Ok((header, question))
}

/// Extract just the domain of the first question, dot-joined ASCII.
pub fn extract_domain(data: &[u8]) -> Result<String, Error> {
    parse_question(data).map(|(_, q)| q.domain)
}
