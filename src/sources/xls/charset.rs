use crate::sources::{SourceError, SourceResult};
use encoding_rs::Encoding;

/// Maps an encoding label such as `latin2` or `cp1251` to the Windows code page a legacy
/// spreadsheet declares for that encoding.
pub fn codepage_for(charset: &str) -> SourceResult<u16> {
    let label = charset.trim();
    let encoding = Encoding::for_label(label.as_bytes())
        .or_else(|| windows_alias(label))
        .ok_or_else(|| SourceError::InvalidFormat(format!("unknown charset {:?}", charset)))?;

    let codepage = match encoding.name() {
        "UTF-8" => 65001,
        "UTF-16LE" => 1200,
        "UTF-16BE" => 1201,
        "IBM866" => 866,
        "windows-874" => 874,
        "Shift_JIS" => 932,
        "GBK" | "gb18030" => 936,
        "EUC-KR" => 949,
        "Big5" => 950,
        "windows-1250" => 1250,
        "windows-1251" => 1251,
        "windows-1252" => 1252,
        "windows-1253" => 1253,
        "windows-1254" => 1254,
        "windows-1255" => 1255,
        "windows-1256" => 1256,
        "windows-1257" => 1257,
        "windows-1258" => 1258,
        "macintosh" => 10000,
        "x-mac-cyrillic" => 10007,
        "KOI8-R" => 20866,
        "KOI8-U" => 21866,
        "ISO-8859-2" => 28592,
        "ISO-8859-3" => 28593,
        "ISO-8859-4" => 28594,
        "ISO-8859-5" => 28595,
        "ISO-8859-6" => 28596,
        "ISO-8859-7" => 28597,
        "ISO-8859-8" => 28598,
        "ISO-8859-13" => 28603,
        "ISO-8859-15" => 28605,
        "EUC-JP" => 20932,
        "ISO-2022-JP" => 50220,
        other => {
            return Err(SourceError::InvalidFormat(format!(
                "charset {:?} ({}) has no spreadsheet code page", charset, other
            )));
        }
    };
    Ok(codepage)
}

/// Accepts `cp1250`-style names, which are common in spreadsheet tooling but not encoding labels.
fn windows_alias(label: &str) -> Option<&'static Encoding> {
    let digits = label
        .strip_prefix("cp")
        .or_else(|| label.strip_prefix("CP"))?;
    Encoding::for_label(format!("windows-{digits}").as_bytes())
}

#[cfg(test)]
mod tests {
    use super::codepage_for;
    use crate::sources::ErrorKind;

    #[test]
    fn labels_map_to_codepages() {
        for (label, codepage) in [
            ("utf-8", 65001),
            ("UTF8", 65001),
            ("latin2", 28592),
            ("windows-1250", 1250),
            ("cp1251", 1251),
            ("CP1252", 1252),
            ("latin1", 1252),
            ("shift_jis", 932),
            (" koi8-r ", 20866),
        ] {
            assert_eq!(codepage_for(label).ok(), Some(codepage), "Unexpected code page for {:?}", label);
        }
    }

    #[test]
    fn unknown_charset_is_invalid() {
        let kind = codepage_for("klingon").err().map(|err| err.kind());
        assert_eq!(kind, Some(ErrorKind::InvalidFormat));
    }
}
