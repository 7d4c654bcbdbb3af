use once_cell::sync::Lazy;
use regex::Regex;

/// target tagから次のtarget tagの直前までをfragmentとして切り出すためのパターン。
static FRAGMENT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#\s?\S+[^#]+").expect("fragment pattern must compile"));

/// fragment内の時間weightマーカーを取り出すためのパターン。
static TIME_PART_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@\s?(\d+)").expect("time part pattern must compile"));

/// target tagの本文を取り出すためのパターン。
static TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#\s?(\S+)").expect("tag pattern must compile"));

/// 数値のみのtarget tagを取り出すためのパターン。
static ISSUE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#\s?(\d+)").expect("issue pattern must compile"));

/// 説明文をtarget tagごとのfragmentへ分割する。
///
/// target tagが2つ未満の場合は説明文全体を1つのfragmentとして返す。
/// 先頭のtagより前のテキストはどのtagにも属さないため含まれない。
pub fn parse_description(description: &str) -> Vec<String> {
    let fragments: Vec<String> = FRAGMENT_PATTERN
        .find_iter(description)
        .map(|m| m.as_str().to_string())
        .collect();
    if fragments.len() < 2 {
        return vec![description.to_string()];
    }
    fragments
}

/// fragmentに埋め込まれた時間weightを返す。
///
/// weightマーカーがない場合は0(未指定)を返す。
pub fn time_part(fragment: &str) -> u32 {
    TIME_PART_PATTERN
        .captures(fragment)
        .and_then(|captures| captures[1].parse().ok())
        .unwrap_or(0)
}

/// fragmentに含まれる最初のtarget tagの本文を返す。
pub fn project_tag(fragment: &str) -> Option<String> {
    TAG_PATTERN
        .captures(fragment)
        .map(|captures| captures[1].to_string())
}

/// fragmentに含まれる最初の数値target tagをissue IDとして返す。
pub fn issue_tag(fragment: &str) -> Option<i64> {
    ISSUE_PATTERN
        .captures(fragment)
        .and_then(|captures| captures[1].parse().ok())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{issue_tag, parse_description, project_tag, time_part};

    /// fragmentの分割を確認する。
    #[rstest]
    #[case::no_tag("plain work without tags", vec!["plain work without tags"])]
    #[case::single_tag("#123 fix stuff", vec!["#123 fix stuff"])]
    #[case::two_tags("#123 fix @2 #456 review", vec!["#123 fix @2 ", "#456 review"])]
    #[case::three_tags("#a one #b two #c three", vec!["#a one ", "#b two ", "#c three"])]
    #[case::leading_text_is_dropped("morning #a one #b two", vec!["#a one ", "#b two"])]
    #[case::tag_with_space("# alpha one # beta two", vec!["# alpha one ", "# beta two"])]
    #[case::empty("", vec![""])]
    fn test_parse_description(#[case] description: &str, #[case] expected: Vec<&str>) {
        assert_eq!(parse_description(description), expected);
    }

    /// weightマーカーの抽出を確認する。
    #[rstest]
    #[case::no_marker("#123 fix stuff", 0)]
    #[case::simple("#123 fix @2 ", 2)]
    #[case::with_space("#123 fix @ 3 ", 3)]
    #[case::first_marker_wins("#123 @12 fix @5 ", 12)]
    #[case::marker_without_digits("#123 fix @now", 0)]
    fn test_time_part(#[case] fragment: &str, #[case] expected: u32) {
        assert_eq!(time_part(fragment), expected);
    }

    /// target tag本文の抽出を確認する。
    #[rstest]
    #[case::project("#myproj some work", Some("myproj"))]
    #[case::numeric("#123 fix", Some("123"))]
    #[case::with_space("# myproj some work", Some("myproj"))]
    #[case::no_tag("plain work", None)]
    fn test_project_tag(#[case] fragment: &str, #[case] expected: Option<&str>) {
        assert_eq!(project_tag(fragment).as_deref(), expected);
    }

    /// 数値tagの抽出を確認する。
    #[rstest]
    #[case::numeric("#123 fix", Some(123))]
    #[case::not_numeric("#myproj some work", None)]
    #[case::later_tag("fix #456 review", Some(456))]
    #[case::no_tag("plain work", None)]
    fn test_issue_tag(#[case] fragment: &str, #[case] expected: Option<i64>) {
        assert_eq!(issue_tag(fragment), expected);
    }
}
