use serde::Serialize;
use std::cmp::Ordering;

use super::catalog::SkillCatalog;
use super::loader::SkillDocument;

/// CLIが予約しているコマンド名（スキル名としては扱わない）
const RESERVED_COMMANDS: &[&str] = &["help", "quit", "list", "match", "show", "check"];

/// 小文字化して連続する空白を1つにまとめる
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// 入力とスキルの対応
#[derive(Debug, Clone, Serialize)]
pub struct TriggerMatch<'a> {
    #[serde(serialize_with = "serialize_skill_name")]
    pub skill: &'a SkillDocument,
    /// マッチしたキーワード
    pub matched: Vec<String>,
    /// /skill-name 形式で明示的に指定されたか
    pub explicit: bool,
    pub score: usize,
}

fn serialize_skill_name<S>(skill: &&SkillDocument, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(skill.name())
}

impl TriggerMatch<'_> {
    pub fn name(&self) -> &str {
        self.skill.name()
    }
}

/// トリガー検出器
pub struct TriggerMatcher<'a> {
    catalog: &'a SkillCatalog,
}

impl<'a> TriggerMatcher<'a> {
    pub fn new(catalog: &'a SkillCatalog) -> Self {
        Self { catalog }
    }

    /// 入力テキストからトリガーにマッチするスキルを検出
    ///
    /// 空入力は空の結果になる。各スキルは最大1回だけ含まれ、
    /// 明示指定 → スコア降順 → 自動適用スキル優先 → 名前昇順で並ぶ。
    pub fn detect(&self, input: &str) -> Vec<TriggerMatch<'a>> {
        let normalized = normalize(input);
        if normalized.is_empty() {
            return Vec::new();
        }

        let explicit_name = Self::extract_skill_name(input.trim()).map(str::to_lowercase);

        let mut matches: Vec<TriggerMatch<'a>> = Vec::new();
        for skill in self.catalog.iter() {
            let matched: Vec<String> = skill
                .keywords()
                .iter()
                .filter(|keyword| contains_phrase(&normalized, keyword))
                .cloned()
                .collect();
            let explicit = explicit_name.as_deref() == Some(skill.name().to_lowercase().as_str());

            if matched.is_empty() && !explicit {
                continue;
            }

            let score = matched.len();
            matches.push(TriggerMatch {
                skill,
                matched,
                explicit,
                score,
            });
        }

        matches.sort_by(compare_matches);
        matches
    }

    /// /skill-name 形式かチェック
    pub fn is_skill_command(input: &str) -> bool {
        match input.strip_prefix('/') {
            Some(rest) => {
                let name = rest.split_whitespace().next().unwrap_or("");
                !name.is_empty() && !RESERVED_COMMANDS.contains(&name)
            }
            None => false,
        }
    }

    /// コマンドからスキル名を抽出
    pub fn extract_skill_name(input: &str) -> Option<&str> {
        if Self::is_skill_command(input) {
            input[1..].split_whitespace().next()
        } else {
            None
        }
    }
}

fn compare_matches(a: &TriggerMatch<'_>, b: &TriggerMatch<'_>) -> Ordering {
    b.explicit
        .cmp(&a.explicit)
        .then_with(|| b.score.cmp(&a.score))
        .then_with(|| b.skill.is_auto().cmp(&a.skill.is_auto()))
        .then_with(|| a.skill.name().cmp(b.skill.name()))
}

/// 単語境界を考慮したフレーズ一致（"money" は "moneyed" にマッチしない）
fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return false;
    }
    haystack.match_indices(phrase).any(|(start, _)| {
        let end = start + phrase.len();
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        before_ok && after_ok
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::catalog::CatalogBuilder;
    use crate::skills::loader::SkillSource;

    fn doc(name: &str, triggers: &[&str], auto: bool) -> SkillDocument {
        let triggers = triggers
            .iter()
            .map(|t| format!("  - {}", t))
            .collect::<Vec<_>>()
            .join("\n");
        let content = format!(
            "---\nname: {}\ndescription: test\ntriggers:\n{}\nauto: {}\n---\nbody of {}",
            name, triggers, auto, name
        );
        SkillDocument::parse(&content, format!("{}/SKILL.md", name).into(), SkillSource::Directory)
            .unwrap()
    }

    fn catalog() -> SkillCatalog {
        let mut builder = CatalogBuilder::new();
        builder.insert(doc("factory", &["factory", "fat constructor"], false)).unwrap();
        builder.insert(doc("value-object", &["value object", "money", "primitive obsession"], false)).unwrap();
        builder.insert(doc("auto-skill", &["factory"], true)).unwrap();
        builder.build()
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Fat\n  Constructor\t"), "fat constructor");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_contains_phrase_word_boundaries() {
        assert!(contains_phrase("i need money now", "money"));
        assert!(contains_phrase("money.", "money"));
        assert!(!contains_phrase("a moneyed class", "money"));
        assert!(contains_phrase("my isbn-13 field", "isbn"));
        assert!(!contains_phrase("anything", ""));
    }

    #[test]
    fn test_detect_orders_by_score_then_auto() {
        let catalog = catalog();
        let matcher = TriggerMatcher::new(&catalog);

        let matches = matcher.detect("A FACTORY with a fat   constructor");
        let names: Vec<_> = matches.iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["factory", "auto-skill"]);
        assert_eq!(matches[0].matched, vec!["factory", "fat constructor"]);
        assert_eq!(matches[0].score, 2);

        let matches = matcher.detect("just a factory");
        let names: Vec<_> = matches.iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["auto-skill", "factory"]);
    }

    #[test]
    fn test_detect_empty_input() {
        let catalog = catalog();
        let matcher = TriggerMatcher::new(&catalog);
        assert!(matcher.detect("").is_empty());
        assert!(matcher.detect("   \n").is_empty());
        assert!(matcher.detect("nothing relevant here").is_empty());
    }

    #[test]
    fn test_explicit_command_ranks_first() {
        let catalog = catalog();
        let matcher = TriggerMatcher::new(&catalog);

        let matches = matcher.detect("/value-object for this factory");
        assert_eq!(matches[0].name(), "value-object");
        assert!(matches[0].explicit);
        assert!(matches.iter().filter(|m| m.name() == "value-object").count() == 1);
    }

    #[test]
    fn test_explicit_command_beats_keyword_matches() {
        let mut builder = CatalogBuilder::new();
        builder
            .insert(
                SkillDocument::parse(
                    "---\nname: plain\n---\nplain body",
                    "plain/SKILL.md".into(),
                    SkillSource::Directory,
                )
                .unwrap(),
            )
            .unwrap();
        builder.insert(doc("other", &["factory", "value object", "money"], false)).unwrap();
        let catalog = builder.build();

        let matches = TriggerMatcher::new(&catalog).detect("/plain factory value object money");
        let ranked: Vec<_> = matches.iter().map(|m| (m.name(), m.score, m.explicit)).collect();
        assert_eq!(ranked, vec![("plain", 0, true), ("other", 3, false)]);
    }

    #[test]
    fn test_explicit_command_ignores_case() {
        let catalog = catalog();
        let matches = TriggerMatcher::new(&catalog).detect("/Value-Object please");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name(), "value-object");
        assert!(matches[0].explicit);
    }

    #[test]
    fn test_is_skill_command() {
        assert!(TriggerMatcher::is_skill_command("/my-skill"));
        assert!(!TriggerMatcher::is_skill_command("/help"));
        assert!(!TriggerMatcher::is_skill_command("/list"));
        assert!(!TriggerMatcher::is_skill_command("/"));
        assert!(!TriggerMatcher::is_skill_command("regular message"));
    }

    #[test]
    fn test_extract_skill_name() {
        assert_eq!(TriggerMatcher::extract_skill_name("/factory fix ctor"), Some("factory"));
        assert_eq!(TriggerMatcher::extract_skill_name("/value-object 123"), Some("value-object"));
        assert_eq!(TriggerMatcher::extract_skill_name("not a command"), None);
    }
}
