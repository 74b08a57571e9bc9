/// One lexical unit of a format string.
///
/// Markers are recognized anywhere; a `/` that does not start a marker is
/// ordinary text. The shorthand forms carry their name, which runs up to the
/// closing `/|` and may not contain `/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Text(&'a str),
    File,
    Ext,
    Tags,
    CondStart,
    True,
    False,
    CondEnd,
    TagCond(&'a str),
    GroupCond(&'a str),
    TagInGroup(&'a str),
    IterStart,
    Occurrence,
    IterEnd,
}

const SIMPLE_MARKERS: &[(&str, Token<'static>)] = &[
    ("/EITER|", Token::IterEnd),
    ("/ITER|", Token::IterStart),
    ("/FILE|", Token::File),
    ("/TAGS|", Token::Tags),
    ("/EXT|", Token::Ext),
    ("/E?|", Token::CondEnd),
    ("/?|", Token::CondStart),
    ("/#|", Token::Occurrence),
    ("/T|", Token::True),
    ("/F|", Token::False),
];

const TAG_IN_GROUP: &str = "/?TIG|";
const TAG_COND: &str = "/?T|";
const GROUP_COND: &str = "/?G|";
const SHORTHAND_END: &str = "/|";

impl<'a> Token<'a> {
    /// Appends the token's source text.
    pub fn push_source(&self, out: &mut String) {
        match self {
            Token::Text(text) => out.push_str(text),
            Token::TagCond(name) => push_shorthand(out, TAG_COND, name),
            Token::GroupCond(name) => push_shorthand(out, GROUP_COND, name),
            Token::TagInGroup(name) => push_shorthand(out, TAG_IN_GROUP, name),
            marker => {
                if let Some((text, _)) = SIMPLE_MARKERS.iter().find(|(_, t)| t == marker) {
                    out.push_str(text);
                }
            }
        }
    }
}

fn push_shorthand(out: &mut String, marker: &str, name: &str) {
    out.push_str(marker);
    out.push_str(name);
    out.push_str(SHORTHAND_END);
}

/// Splits a format string into tokens in a single left-to-right pass.
pub fn tokenize(source: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut text_start = 0;
    let mut pos = 0;

    while let Some(ch) = source[pos..].chars().next() {
        if ch == '/' {
            if let Some((token, len)) = match_marker(&source[pos..]) {
                if text_start < pos {
                    tokens.push(Token::Text(&source[text_start..pos]));
                }
                tokens.push(token);
                pos += len;
                text_start = pos;
                continue;
            }
        }
        pos += ch.len_utf8();
    }
    if text_start < source.len() {
        tokens.push(Token::Text(&source[text_start..]));
    }
    tokens
}

fn match_marker<'r>(rest: &'r str) -> Option<(Token<'r>, usize)> {
    let shorthands: [(&str, fn(&'r str) -> Token<'r>); 3] = [
        (TAG_IN_GROUP, Token::TagInGroup),
        (TAG_COND, Token::TagCond),
        (GROUP_COND, Token::GroupCond),
    ];
    for (marker, build) in shorthands {
        if let Some(after) = rest.strip_prefix(marker) {
            if let Some(name) = shorthand_name(after) {
                return Some((build(name), marker.len() + name.len() + SHORTHAND_END.len()));
            }
        }
    }
    SIMPLE_MARKERS
        .iter()
        .find(|(text, _)| rest.starts_with(text))
        .map(|(text, token)| (*token, text.len()))
}

fn shorthand_name(after: &str) -> Option<&str> {
    let end = after.find('/')?;
    if end == 0 || !after[end..].starts_with(SHORTHAND_END) {
        return None;
    }
    Some(&after[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source_of(tokens: &[Token<'_>]) -> String {
        let mut out = String::new();
        for t in tokens {
            t.push_source(&mut out);
        }
        out
    }

    #[test]
    fn plain_text_is_one_token() {
        assert_eq!(tokenize("Beer Bottle"), vec![Token::Text("Beer Bottle")]);
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn simple_markers() {
        assert_eq!(
            tokenize("/FILE|/TAGS|/EXT|"),
            vec![Token::File, Token::Tags, Token::Ext]
        );
    }

    #[test]
    fn conditional_markers() {
        assert_eq!(
            tokenize("/?|a/&|b/T|yes/F|no/E?|"),
            vec![
                Token::CondStart,
                Token::Text("a/&|b"),
                Token::True,
                Token::Text("yes"),
                Token::False,
                Token::Text("no"),
                Token::CondEnd,
            ]
        );
    }

    #[test]
    fn shorthand_markers_capture_names() {
        assert_eq!(
            tokenize("/?TIG|Beer Styles/|/?T|ipa/|/?G|Beer/|"),
            vec![
                Token::TagInGroup("Beer Styles"),
                Token::TagCond("ipa"),
                Token::GroupCond("Beer"),
            ]
        );
    }

    #[test]
    fn unterminated_shorthand_is_text() {
        assert_eq!(tokenize("/?T|ipa"), vec![Token::Text("/?T|ipa")]);
        assert_eq!(tokenize("/?T|/|"), vec![Token::Text("/?T|/|")]);
    }

    #[test]
    fn iteration_markers() {
        assert_eq!(
            tokenize("x/ITER| /#|/EITER|"),
            vec![
                Token::Text("x"),
                Token::IterStart,
                Token::Text(" "),
                Token::Occurrence,
                Token::IterEnd,
            ]
        );
    }

    #[test]
    fn stray_slashes_are_text() {
        assert_eq!(tokenize("a/b/"), vec![Token::Text("a/b/")]);
        assert_eq!(tokenize("/G|Beer"), vec![Token::Text("/G|Beer")]);
    }

    #[test]
    fn handles_multibyte_text() {
        assert_eq!(
            tokenize("Café/FILE|ü"),
            vec![Token::Text("Café"), Token::File, Token::Text("ü")]
        );
    }

    #[test]
    fn source_round_trips() {
        for s in [
            "/?|a/T|/FILE|/F|b/E?|",
            "/?TIG|Beer/|-/ITER|/#|/EITER|",
            "plain/text",
            "/?T|x/|/?G|y/|",
        ] {
            assert_eq!(source_of(&tokenize(s)), s);
        }
    }
}
