//! Zeek 日志头部解析
//!
//! Zeek ASCII 日志以若干 `#` 开头的头部行自描述：
//!
//! ```text
//! #separator \x09
//! #set_separator	,
//! #empty_field	(empty)
//! #unset_field	-
//! #path	dns
//! #open	2020-06-15-10-00-00
//! #fields	ts	uid
//! #types	time	string
//! ```
//!
//! `#separator` 行总是以空格分隔，其余头部行使用它声明的分隔符。
//! [`HeaderParser`] 是一个逐行喂入的状态机，遇到分隔符之后的第一条非 `#` 行即认为头部结束。

use crate::error::ParseError;
use crate::parser::constants::*;
use chrono::NaiveDateTime;
use std::collections::HashMap;

/// 一个日志文件的头部信息
///
/// 每个文件解析一次，之后不再修改。
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogHeader {
    /// 字段分隔符，默认制表符
    pub separator: String,

    /// 集合/向量字段内部的分隔符，默认逗号
    pub set_separator: String,

    /// 空集合标记，默认 `(empty)`
    pub empty_field: String,

    /// 未设置字段标记，默认 `-`
    pub unset_field: String,

    /// 日志路径标签，如 `dns`
    pub path: String,

    /// 日志打开时间（`#open`）
    pub open: Option<NaiveDateTime>,

    /// 字段名，顺序即数据行中的列顺序
    pub field_order: Vec<String>,

    /// 字段名 -> 声明类型
    pub field_types: HashMap<String, String>,
}

impl Default for LogHeader {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            set_separator: DEFAULT_SET_SEPARATOR.to_string(),
            empty_field: DEFAULT_EMPTY_FIELD.to_string(),
            unset_field: DEFAULT_UNSET_FIELD.to_string(),
            path: String::new(),
            open: None,
            field_order: Vec::new(),
            field_types: HashMap::new(),
        }
    }
}

impl LogHeader {
    /// 声明的字段数量
    pub fn field_count(&self) -> usize {
        self.field_order.len()
    }

    /// 查询字段的声明类型
    pub fn field_type(&self, name: &str) -> Option<&str> {
        self.field_types.get(name).map(String::as_str)
    }

    /// 值是否为未设置标记
    pub fn is_unset(&self, value: &str) -> bool {
        value == self.unset_field
    }

    /// 值是否为空集合标记
    pub fn is_empty_set(&self, value: &str) -> bool {
        value == self.empty_field
    }
}

/// [`HeaderParser::feed`] 对一行的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderLine {
    /// 该行属于头部（或是分隔符出现之前被忽略的行）
    Consumed,
    /// 该行是第一条数据行，头部到此结束
    Boundary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderState {
    SeekingSeparator,
    ReadingMeta,
}

/// 逐行喂入的头部解析状态机
#[derive(Debug)]
pub struct HeaderParser {
    state: HeaderState,
    header: LogHeader,
    fields_line: Option<String>,
    types_line: Option<String>,
    schema_built: bool,
    date_error: Option<ParseError>,
}

impl Default for HeaderParser {
    fn default() -> Self {
        Self::new()
    }
}

impl HeaderParser {
    pub fn new() -> Self {
        Self {
            state: HeaderState::SeekingSeparator,
            header: LogHeader::default(),
            fields_line: None,
            types_line: None,
            schema_built: false,
            date_error: None,
        }
    }

    /// 喂入一行
    ///
    /// # 错误
    ///
    /// - `EmptySeparator` - `#separator` 的值无法解码
    /// - `MismatchedHeaderFields` / `DuplicateHeaderField` - 字段与类型无法一一对应，立即失败
    pub fn feed(&mut self, line: &str) -> Result<HeaderLine, ParseError> {
        match self.state {
            HeaderState::SeekingSeparator => {
                if let Some(separator) = separator_from_line(line) {
                    if separator.is_empty() {
                        return Err(ParseError::EmptySeparator {
                            raw: line.to_string(),
                        });
                    }
                    self.header.separator = separator;
                    self.state = HeaderState::ReadingMeta;
                }
                Ok(HeaderLine::Consumed)
            }
            HeaderState::ReadingMeta => {
                if !line.starts_with(HEADER_PREFIX) {
                    return Ok(HeaderLine::Boundary);
                }
                self.read_meta_line(line)?;
                self.try_build_schema()?;
                Ok(HeaderLine::Consumed)
            }
        }
    }

    /// 是否已经见到分隔符行
    pub fn has_separator(&self) -> bool {
        self.state == HeaderState::ReadingMeta
    }

    /// 结束解析并返回头部
    ///
    /// 中途记录下的 `#open` 日期错误在这里返回。
    pub fn finish(self) -> Result<LogHeader, ParseError> {
        if self.state == HeaderState::SeekingSeparator {
            return Err(ParseError::MissingSeparator);
        }
        if let Some(err) = self.date_error {
            return Err(err);
        }

        log::debug!(
            "parsed header: path={:?} fields={}",
            self.header.path,
            self.header.field_count()
        );
        Ok(self.header)
    }

    fn read_meta_line(&mut self, line: &str) -> Result<(), ParseError> {
        let Some((name, value)) = pull_var(line, &self.header.separator) else {
            return Ok(());
        };

        match name {
            TAG_SET_SEPARATOR => self.header.set_separator = unescape_field_value(value),
            TAG_UNSET_FIELD => self.header.unset_field = unescape_field_value(value),
            TAG_EMPTY_FIELD => self.header.empty_field = unescape_field_value(value),
            TAG_PATH => self.header.path = unescape_field_value(value),
            TAG_OPEN => match NaiveDateTime::parse_from_str(value, ZEEK_DATETIME_FMT) {
                Ok(open) => self.header.open = Some(open),
                Err(_) => {
                    if self.date_error.is_none() {
                        self.date_error = Some(ParseError::HeaderDateParse {
                            value: value.to_string(),
                        });
                    }
                }
            },
            TAG_FIELDS => self.fields_line = Some(line.to_string()),
            TAG_TYPES => self.types_line = Some(line.to_string()),
            _ => {}
        }
        Ok(())
    }

    fn try_build_schema(&mut self) -> Result<(), ParseError> {
        if self.schema_built {
            return Ok(());
        }
        let (Some(fields_line), Some(types_line)) = (&self.fields_line, &self.types_line) else {
            return Ok(());
        };

        // 第一个 token 是标签本身（fields / types）
        let names: Vec<&str> = fields_line.split_whitespace().skip(1).collect();
        let types: Vec<&str> = types_line.split_whitespace().skip(1).collect();

        if names.len() != types.len() {
            return Err(ParseError::MismatchedHeaderFields {
                fields: names.len(),
                types: types.len(),
            });
        }

        let mut field_types = HashMap::with_capacity(names.len());
        for (name, field_type) in names.iter().zip(&types) {
            if field_types
                .insert(name.to_string(), field_type.to_string())
                .is_some()
            {
                return Err(ParseError::DuplicateHeaderField {
                    name: name.to_string(),
                });
            }
        }

        self.header.field_order = names.into_iter().map(String::from).collect();
        self.header.field_types = field_types;
        self.schema_built = true;
        Ok(())
    }
}

/// 解码头部中的十六进制转义值
///
/// 以 `\x` 开头的值去掉所有 `\x` 后按十六进制解码，恰好得到 1 个 ASCII 字节时返回该字符，
/// 否则返回空字符串。其他值原样返回。
pub fn unescape_field_value(value: &str) -> String {
    if !value.starts_with(HEX_ESCAPE_PREFIX) {
        return value.to_string();
    }

    let digits = value.replace(HEX_ESCAPE_PREFIX, "");
    match hex::decode(digits) {
        // 数据行按 UTF-8 解码，非 ASCII 的单字节永远无法匹配
        Ok(bytes) if bytes.len() == 1 && bytes[0].is_ascii() => char::from(bytes[0]).to_string(),
        _ => String::new(),
    }
}

/// 从 `#separator` 行中提取分隔符
///
/// 不是分隔符行时返回 `None`；值无法解码时返回空字符串。
pub fn separator_from_line(line: &str) -> Option<String> {
    if !line.starts_with(SEPARATOR_LINE_PREFIX) {
        return None;
    }

    let mut tokens = line[HEADER_PREFIX.len_utf8()..].split_whitespace();
    match (tokens.next(), tokens.next()) {
        (Some(TAG_SEPARATOR), Some(value)) => Some(unescape_field_value(value)),
        _ => None,
    }
}

/// 拆出头部行的标签和值
///
/// 去掉开头的 `#` 后按分隔符切分，取前两个 token。行内不含分隔符时返回 `None`。
pub fn pull_var<'a>(line: &'a str, separator: &str) -> Option<(&'a str, &'a str)> {
    let rest = line.strip_prefix(HEADER_PREFIX)?;

    let mut tokens = rest.split(separator);
    match (tokens.next(), tokens.next()) {
        (Some(name), Some(value)) => Some((name, value)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(lines: &[&str]) -> Result<LogHeader, ParseError> {
        let mut parser = HeaderParser::new();
        for line in lines {
            if parser.feed(line)? == HeaderLine::Boundary {
                break;
            }
        }
        parser.finish()
    }

    const DNS_HEADER: &[&str] = &[
        "#separator \\x09",
        "#set_separator\t,",
        "#empty_field\t(empty)",
        "#unset_field\t-",
        "#path\tdns",
        "#open\t2020-06-15-10-00-00",
        "#fields\tts\tuid",
        "#types\ttime\tstring",
        "1592266854.705260\tCHhAvVGS1DHFjwGM9",
    ];

    #[test]
    fn unescape_hex_values() {
        assert_eq!(unescape_field_value("\\x09"), "\t");
        assert_eq!(unescape_field_value("\\x2c"), ",");
        assert_eq!(unescape_field_value("something easy"), "something easy");
        assert_eq!(unescape_field_value("(empty)"), "(empty)");
    }

    #[test]
    fn non_ascii_escape_is_empty() {
        assert_eq!(unescape_field_value("\\xfe"), "");
        assert_eq!(unescape_field_value("\\x7f"), "\u{7f}");

        let mut parser = HeaderParser::new();
        assert!(matches!(
            parser.feed("#separator \\xfe"),
            Err(ParseError::EmptySeparator { .. })
        ));
    }

    #[test]
    fn unescape_failures_yield_empty() {
        assert_eq!(unescape_field_value("\\xzz"), "");
        assert_eq!(unescape_field_value("\\x09\\x09"), "");
        assert_eq!(unescape_field_value("\\x"), "");
    }

    #[test]
    fn separator_line_extraction() {
        assert_eq!(separator_from_line("#separator \\x09").as_deref(), Some("\t"));
        assert_eq!(separator_from_line("#separator ,").as_deref(), Some(","));
        assert_eq!(separator_from_line("hello"), None);
        assert_eq!(separator_from_line("#separatorx ,"), None);
        assert_eq!(separator_from_line("#separator"), None);
    }

    #[test]
    fn pull_var_splits_tag_and_value() {
        assert_eq!(
            pull_var("#dummyField value", " "),
            Some(("dummyField", "value"))
        );
        assert_eq!(pull_var("#path\tdns", "\t"), Some(("path", "dns")));
        assert_eq!(pull_var("dummyField value", " "), None);
        assert_eq!(pull_var("#lonely", "\t"), None);
    }

    #[test]
    fn meta_line_without_separator_is_ignored() {
        assert_eq!(pull_var("#path dns", "\t"), None);

        let header = feed_all(&["#separator \\x09", "#path dns", "#unset_field\t-"]).unwrap();
        assert_eq!(header.path, "");
        assert_eq!(header.unset_field, "-");
    }

    #[test]
    fn parses_complete_header() {
        let header = feed_all(DNS_HEADER).unwrap();
        assert_eq!(header.separator, "\t");
        assert_eq!(header.set_separator, ",");
        assert_eq!(header.empty_field, "(empty)");
        assert_eq!(header.unset_field, "-");
        assert_eq!(header.path, "dns");
        assert_eq!(header.field_order, vec!["ts", "uid"]);
        assert_eq!(header.field_type("ts"), Some("time"));
        assert_eq!(header.field_type("uid"), Some("string"));
        assert_eq!(
            header.open.unwrap().format("%Y-%m-%d %H:%M:%S").to_string(),
            "2020-06-15 10:00:00"
        );
    }

    #[test]
    fn stops_at_first_data_line() {
        let mut parser = HeaderParser::new();
        for line in &DNS_HEADER[..8] {
            assert_eq!(parser.feed(line).unwrap(), HeaderLine::Consumed);
        }
        assert_eq!(parser.feed(DNS_HEADER[8]).unwrap(), HeaderLine::Boundary);
    }

    #[test]
    fn lines_before_separator_are_ignored() {
        let mut parser = HeaderParser::new();
        assert_eq!(parser.feed("garbage").unwrap(), HeaderLine::Consumed);
        assert_eq!(parser.feed("#path\tnot-yet").unwrap(), HeaderLine::Consumed);
        assert!(!parser.has_separator());
        parser.feed("#separator \\x09").unwrap();
        assert!(parser.has_separator());
        let header = parser.finish().unwrap();
        assert_eq!(header.path, "");
    }

    #[test]
    fn mismatched_fields_fail_fast() {
        let mut parser = HeaderParser::new();
        parser.feed("#separator \\x09").unwrap();
        parser.feed("#fields\tts\tuid\tquery").unwrap();
        let err = parser.feed("#types\ttime\tstring").unwrap_err();
        assert_eq!(
            err,
            ParseError::MismatchedHeaderFields {
                fields: 3,
                types: 2
            }
        );
    }

    #[test]
    fn duplicate_field_names_are_rejected() {
        let result = feed_all(&[
            "#separator \\x09",
            "#fields\tts\tts",
            "#types\ttime\ttime",
        ]);
        assert_eq!(
            result,
            Err(ParseError::DuplicateHeaderField {
                name: "ts".to_string()
            })
        );
    }

    #[test]
    fn bad_open_date_is_reported_at_finish() {
        let mut parser = HeaderParser::new();
        parser.feed("#separator \\x09").unwrap();
        parser.feed("#open\t2020-13-45-99-00-00").unwrap();
        parser.feed("#path\tconn").unwrap();
        assert_eq!(
            parser.finish(),
            Err(ParseError::HeaderDateParse {
                value: "2020-13-45-99-00-00".to_string()
            })
        );
    }

    #[test]
    fn missing_separator_is_an_error() {
        assert_eq!(
            feed_all(&["#path\tdns", "a\tb"]),
            Err(ParseError::MissingSeparator)
        );
    }

    #[test]
    fn undecodable_separator_is_an_error() {
        let mut parser = HeaderParser::new();
        assert!(matches!(
            parser.feed("#separator \\xqq"),
            Err(ParseError::EmptySeparator { .. })
        ));
    }

    #[test]
    fn unknown_tags_are_ignored() {
        let header = feed_all(&[
            "#separator \\x09",
            "#close\t2020-06-15-11-00-00",
            "#future_directive\tsomething",
            "#path\tconn",
        ])
        .unwrap();
        assert_eq!(header.path, "conn");
        assert!(header.field_order.is_empty());
    }

    #[test]
    fn custom_separator_applies_to_meta_lines() {
        let header = feed_all(&[
            "#separator ,",
            "#set_separator,\\x7c",
            "#path,http",
        ])
        .unwrap();
        assert_eq!(header.separator, ",");
        assert_eq!(header.set_separator, "|");
        assert_eq!(header.path, "http");
    }
}
