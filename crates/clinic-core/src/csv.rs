//! CSV字段编解码
//!
//! 平面文件中每个字段的转义规则：含分隔符、引号或换行的字段用双引号包裹，
//! 字段内的引号加倍。解码是编码的精确逆运算。

/// 字段分隔符
pub const DELIMITER: char = ',';

const QUOTE: char = '"';

/// 判断字段是否需要加引号
fn needs_quotes(field: &str) -> bool {
    field
        .chars()
        .any(|c| c == DELIMITER || c == QUOTE || c == '\n' || c == '\r')
}

/// 编码单个字段
pub fn encode_field(field: &str) -> String {
    if !needs_quotes(field) {
        return field.to_string();
    }

    let mut encoded = String::with_capacity(field.len() + 2);
    encoded.push(QUOTE);
    for c in field.chars() {
        if c == QUOTE {
            encoded.push(QUOTE);
        }
        encoded.push(c);
    }
    encoded.push(QUOTE);
    encoded
}

/// 解码单个字段
///
/// 去掉一对首尾引号并还原加倍的引号；未加引号的字段原样返回。
pub fn decode_field(text: &str) -> String {
    let quoted = text.len() >= 2 && text.starts_with(QUOTE) && text.ends_with(QUOTE);
    if !quoted {
        return text.to_string();
    }
    text[1..text.len() - 1].replace("\"\"", "\"")
}

/// 把一条记录的字段编码并拼接成一行
pub fn join_record<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| encode_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(&DELIMITER.to_string())
}

/// 解析整个文档为记录列表
///
/// 识别引号内的分隔符和换行，接受 CRLF 与 LF 行尾，跳过空行。
/// 返回的字段已经解码。
pub fn parse_document(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == QUOTE {
                if chars.peek() == Some(&QUOTE) {
                    field.push(QUOTE);
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }

        match c {
            QUOTE if field.is_empty() => in_quotes = true,
            DELIMITER => record.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => finish_record(&mut records, &mut record, &mut field),
            _ => field.push(c),
        }
    }
    finish_record(&mut records, &mut record, &mut field);

    records
}

fn finish_record(records: &mut Vec<Vec<String>>, record: &mut Vec<String>, field: &mut String) {
    record.push(std::mem::take(field));
    let blank = record.len() == 1 && record[0].trim().is_empty();
    let done = std::mem::take(record);
    if !blank {
        records.push(done);
    }
}

/// 尽力解析整数字段
///
/// 跳过前导空白，接受可选符号，读取到第一个非数字字符为止；
/// 没有任何数字时返回 0，溢出时饱和，从不失败。
pub fn parse_int_lossy(text: &str) -> i64 {
    let trimmed = text.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value.saturating_mul(10).saturating_add(i64::from(b - b'0'));
    }

    if negative {
        -value
    } else {
        value
    }
}

/// 尽力解析非负整数字段，负数与非法输入都归零
pub fn parse_u32_lossy(text: &str) -> u32 {
    parse_int_lossy(text).clamp(0, i64::from(u32::MAX)) as u32
}
