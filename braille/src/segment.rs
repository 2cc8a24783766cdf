//! Script segmentation of input text.

use std::fmt;

/// Script class of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunTag {
    Hangul,
    Latin,
    Numeric,
    Other,
}

/// A language with its own pair of translation tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Language {
    Hangul,
    Latin,
    Other,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Hangul, Language::Latin, Language::Other];

    pub fn name(self) -> &'static str {
        match self {
            Language::Hangul => "hangul",
            Language::Latin => "latin",
            Language::Other => "other",
        }
    }

    pub fn from_name(name: &str) -> Option<Language> {
        Language::ALL.into_iter().find(|l| l.name() == name)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl RunTag {
    pub fn name(self) -> &'static str {
        match self {
            RunTag::Hangul => "hangul",
            RunTag::Latin => "latin",
            RunTag::Numeric => "numeric",
            RunTag::Other => "other",
        }
    }

    /// Language whose tables translate runs of this tag. Digits have none.
    pub fn language(self) -> Option<Language> {
        match self {
            RunTag::Hangul => Some(Language::Hangul),
            RunTag::Latin => Some(Language::Latin),
            RunTag::Other => Some(Language::Other),
            RunTag::Numeric => None,
        }
    }
}

impl From<Language> for RunTag {
    fn from(lang: Language) -> RunTag {
        match lang {
            Language::Hangul => RunTag::Hangul,
            Language::Latin => RunTag::Latin,
            Language::Other => RunTag::Other,
        }
    }
}

/// Maximal span of text sharing one tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run<'a> {
    pub tag: RunTag,
    pub text: &'a str,
    /// Byte offset of the run in the segmented text.
    pub start: usize,
}

pub fn is_hangul(c: char) -> bool {
    matches!(c as u32, 0xAC00..=0xD7A3 | 0x1100..=0x11FF | 0x3130..=0x318F)
}

/// Total classification of characters.
pub fn classify(c: char) -> RunTag {
    if is_hangul(c) {
        RunTag::Hangul
    } else if c.is_ascii_alphabetic() {
        RunTag::Latin
    } else if c.is_ascii_digit() {
        RunTag::Numeric
    } else {
        RunTag::Other
    }
}

/// Split `text` into runs of equal class, in order.
///
/// The runs partition the text: concatenating their `text` fields gives
/// back the input.
pub fn segment(text: &str) -> Vec<Run<'_>> {
    let mut runs = Vec::new();
    let mut current: Option<(RunTag, usize)> = None;

    for (i, c) in text.char_indices() {
        let tag = classify(c);
        match current {
            Some((t, _)) if t == tag => {}
            Some((t, start)) => {
                runs.push(Run {
                    tag: t,
                    text: &text[start..i],
                    start,
                });
                current = Some((tag, i));
            }
            None => current = Some((tag, i)),
        }
    }
    if let Some((tag, start)) = current {
        runs.push(Run {
            tag,
            text: &text[start..],
            start,
        });
    }
    runs
}

/// Overall script of a text, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(rename_all = "lowercase")
)]
pub enum TextScript {
    Hangul,
    Latin,
    Mixed,
    Other,
}

/// Digits and punctuation are neutral.
pub fn classify_text(text: &str) -> TextScript {
    let mut hangul = false;
    let mut latin = false;
    for c in text.chars() {
        match classify(c) {
            RunTag::Hangul => hangul = true,
            RunTag::Latin => latin = true,
            _ => {}
        }
        if hangul && latin {
            return TextScript::Mixed;
        }
    }
    match (hangul, latin) {
        (true, false) => TextScript::Hangul,
        (false, true) => TextScript::Latin,
        _ => TextScript::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(text: &str) -> Vec<(RunTag, &str)> {
        segment(text).into_iter().map(|r| (r.tag, r.text)).collect()
    }

    #[test]
    fn empty_input_has_no_runs() {
        assert!(segment("").is_empty());
    }

    #[test]
    fn lone_character_is_a_run() {
        assert_eq!(tags("a"), vec![(RunTag::Latin, "a")]);
    }

    #[test]
    fn mixed_text_splits_on_class_change() {
        assert_eq!(
            tags("ABC 123 한글!"),
            vec![
                (RunTag::Latin, "ABC"),
                (RunTag::Other, " "),
                (RunTag::Numeric, "123"),
                (RunTag::Other, " "),
                (RunTag::Hangul, "한글"),
                (RunTag::Other, "!"),
            ]
        );
    }

    #[test]
    fn runs_partition_input() {
        let text = "Hello, 세계 42 times!\tok";
        let runs = segment(text);
        let joined: String = runs.iter().map(|r| r.text).collect();
        assert_eq!(joined, text);
        for r in &runs {
            assert_eq!(&text[r.start..r.start + r.text.len()], r.text);
        }
    }

    #[test]
    fn compatibility_jamo_are_hangul() {
        assert_eq!(classify('ㄱ'), RunTag::Hangul);
        assert_eq!(classify('\u{1100}'), RunTag::Hangul);
        assert_eq!(classify('é'), RunTag::Other);
    }

    #[test]
    fn classify_text_reports_mixture() {
        assert_eq!(classify_text("hello 123"), TextScript::Latin);
        assert_eq!(classify_text("안녕"), TextScript::Hangul);
        assert_eq!(classify_text("안녕 hi"), TextScript::Mixed);
        assert_eq!(classify_text("42!"), TextScript::Other);
    }

    #[test]
    fn language_names_round_trip() {
        for lang in Language::ALL {
            assert_eq!(Language::from_name(lang.name()), Some(lang));
        }
    }
}
