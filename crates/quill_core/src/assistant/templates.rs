use super::{AssistantAction, AssistantRequest, Tone};

const TOPIC_WORDS: usize = 4;
const STOP_WORDS: [&str; 24] = [
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "in", "is", "it", "of", "on",
    "or", "that", "the", "this", "to", "was", "we", "with", "i",
];

/// Fill the template for `request.action` from the source text.
pub fn compose(request: &AssistantRequest) -> String {
    let source = normalize_spaces(&request.source);
    if source.is_empty() {
        if let AssistantAction::Custom(prompt) = &request.action {
            return custom(prompt, "");
        }
        return format!(
            "There is no text to work with yet. Write a few sentences or select a passage, then choose \"{}\" again.",
            request.action.label()
        );
    }
    match &request.action {
        AssistantAction::ContinueWriting => continue_writing(&source),
        AssistantAction::Summarize => summarize(&source),
        AssistantAction::Improve => improve(&source),
        AssistantAction::MakeShorter => shorten(&source),
        AssistantAction::MakeLonger => lengthen(&source),
        AssistantAction::ChangeTone(tone) => change_tone(&source, *tone),
        AssistantAction::Custom(prompt) => custom(prompt, &source),
    }
}

fn normalize_spaces(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn sentences(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        current.push(ch);
        if matches!(ch, '.' | '!' | '?') {
            let sentence = current.trim().to_string();
            if !sentence.is_empty() {
                out.push(sentence);
            }
            current.clear();
        }
    }
    let tail = current.trim();
    if !tail.is_empty() {
        out.push(tail.to_string());
    }
    out
}

fn with_terminal_punctuation(sentence: &str) -> String {
    let trimmed = sentence.trim_end();
    if trimmed.ends_with(['.', '!', '?']) {
        trimmed.to_string()
    } else {
        format!("{}.", trimmed)
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn title_case(word: &str) -> String {
    capitalize(&word.to_lowercase())
}

/// Up to four significant words, title-cased.
fn topic(text: &str) -> String {
    let words: Vec<String> = text
        .split_whitespace()
        .map(|word| word.trim_matches(|ch: char| !ch.is_alphanumeric()))
        .filter(|word| !word.is_empty() && !STOP_WORDS.contains(&word.to_lowercase().as_str()))
        .take(TOPIC_WORDS)
        .map(title_case)
        .collect();
    if words.is_empty() {
        "This Topic".to_string()
    } else {
        words.join(" ")
    }
}

fn continue_writing(source: &str) -> String {
    let topic = topic(source);
    format!(
        "Building on this, it is worth looking more closely at {topic}. \
         The points above suggest a few practical next steps, and each of them \
         can be tested against real examples. Taken together, they give {topic} \
         a clearer direction and make the next decision easier."
    )
}

fn summarize(source: &str) -> String {
    let all = sentences(source);
    let first = all
        .first()
        .map(|sentence| with_terminal_punctuation(sentence))
        .unwrap_or_default();
    format!(
        "Summary: {} In short, the passage covers {} in {} words across {} sentence{}.",
        first,
        topic(source),
        word_count(source),
        all.len(),
        if all.len() == 1 { "" } else { "s" }
    )
}

fn improve(source: &str) -> String {
    let replacements = [
        ("a lot of ", "many "),
        ("very good", "excellent"),
        ("very bad", "poor"),
        ("really ", ""),
        ("kind of ", ""),
        ("in order to ", "to "),
    ];
    let mut text = source.to_string();
    for (from, to) in replacements {
        text = replace_case_insensitive(&text, from, to);
    }
    sentences(&text)
        .iter()
        .map(|sentence| with_terminal_punctuation(&capitalize(sentence)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn shorten(source: &str) -> String {
    let all = sentences(source);
    let target = (word_count(source) / 2).max(1);
    let mut kept = Vec::new();
    let mut words = 0;
    for sentence in &all {
        if words >= target && !kept.is_empty() {
            break;
        }
        words += word_count(sentence);
        kept.push(sentence.clone());
    }
    if kept.len() == all.len() && all.len() == 1 && words > 12 {
        // One long sentence: keep its first half.
        let half: Vec<&str> = source.split_whitespace().take(target.max(6)).collect();
        return with_terminal_punctuation(half.join(" ").trim_end_matches([',', ';', ':']));
    }
    kept.iter()
        .map(|sentence| with_terminal_punctuation(sentence))
        .collect::<Vec<_>>()
        .join(" ")
}

fn lengthen(source: &str) -> String {
    let topic = topic(source);
    format!(
        "{} To put this in context, {} touches on several related ideas. \
         Each of them adds detail to the original point and shows how it applies in practice. \
         Considering these angles gives a fuller picture of {}.",
        with_terminal_punctuation(source),
        topic,
        topic
    )
}

fn change_tone(source: &str, tone: Tone) -> String {
    match tone {
        Tone::Professional => {
            let mut text = source.to_string();
            for (from, to) in [
                ("don't", "do not"),
                ("can't", "cannot"),
                ("won't", "will not"),
                ("it's", "it is"),
                ("isn't", "is not"),
                ("gonna", "going to"),
                ("wanna", "want to"),
            ] {
                text = replace_case_insensitive(&text, from, to);
            }
            improve(&text)
        }
        Tone::Casual => {
            let mut text = source.to_string();
            for (from, to) in [
                ("do not", "don't"),
                ("cannot", "can't"),
                ("will not", "won't"),
                ("it is", "it's"),
                ("is not", "isn't"),
            ] {
                text = replace_case_insensitive(&text, from, to);
            }
            format!("So, here's the thing: {}", lowercase_first(&text))
        }
        Tone::Friendly => format!(
            "Hi there! {} Hope this helps, and let me know if anything is unclear!",
            with_terminal_punctuation(source)
        ),
        Tone::Confident => {
            let mut text = source.to_string();
            for hedge in ["i think ", "maybe ", "perhaps ", "probably ", "sort of ", "somewhat "] {
                text = replace_case_insensitive(&text, hedge, "");
            }
            sentences(&text)
                .iter()
                .map(|sentence| with_terminal_punctuation(&capitalize(sentence)))
                .collect::<Vec<_>>()
                .join(" ")
        }
    }
}

fn custom(prompt: &str, source: &str) -> String {
    let prompt = normalize_spaces(prompt);
    let basis = if source.is_empty() { prompt.as_str() } else { source };
    let topic = topic(basis);
    if prompt.is_empty() {
        return format!(
            "Tell me what to do with the text about {topic}, for example \"turn this into a list\"."
        );
    }
    format!(
        "Here is a draft for \"{prompt}\":\n\n{topic} matters because it shapes how the rest of \
         the document reads. Start with the main idea, support it with one concrete example, \
         and close with what the reader should do next."
    )
}

fn lowercase_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// ASCII case-insensitive replace of every occurrence of `from`.
fn replace_case_insensitive(text: &str, from: &str, to: &str) -> String {
    if from.is_empty() {
        return text.to_string();
    }
    let lower = text.to_ascii_lowercase();
    let needle = from.to_ascii_lowercase();
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    while let Some(found) = lower[cursor..].find(&needle) {
        let start = cursor + found;
        out.push_str(&text[cursor..start]);
        out.push_str(to);
        cursor = start + needle.len();
    }
    out.push_str(&text[cursor..]);
    out
}
