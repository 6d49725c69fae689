use anyhow::{Result, bail};
use std::sync::Arc;
use tracing::debug;

use domain::{
    repositories::text_generation::TextGenerationClient,
    value_objects::generation::{
        CampaignPreview, FollowUpPreview, LeadProfile, SUBJECT_COUNT, SUBJECT_MAX_CHARS,
    },
};

/// Builds the outreach prompts, runs them through the configured model and
/// normalizes the output into a predictable shape.
pub struct ContentGeneratorUseCase<A>
where
    A: TextGenerationClient + Send + Sync + 'static,
{
    text_client: Arc<A>,
}

impl<A> ContentGeneratorUseCase<A>
where
    A: TextGenerationClient + Send + Sync + 'static,
{
    pub fn new(text_client: Arc<A>) -> Self {
        Self { text_client }
    }

    pub async fn generate_subjects(
        &self,
        lead: &LeadProfile,
        tone: &str,
    ) -> Result<Vec<String>> {
        let prompt = subject_prompt(lead, tone);
        let raw = self.text_client.generate(prompt, 100, 0.7).await?;

        debug!(lead = %lead.email, raw_len = raw.len(), "content: subject lines generated");
        Ok(normalize_subjects(&raw, lead))
    }

    pub async fn generate_body(&self, lead: &LeadProfile, tone: &str) -> Result<String> {
        let prompt = body_prompt(lead, tone);
        let raw = self.text_client.generate(prompt, 400, 0.8).await?;

        debug!(lead = %lead.email, raw_len = raw.len(), "content: email body generated");
        Ok(raw.trim().to_string())
    }

    pub async fn generate_follow_up(
        &self,
        lead: &LeadProfile,
        tone: &str,
        sequence: u8,
        original_subject: &str,
    ) -> Result<String> {
        let (prompt, max_tokens) = match sequence {
            1 => (follow_up_1_prompt(lead, tone, original_subject), 250),
            2 => (follow_up_2_prompt(lead, tone), 200),
            3 => (follow_up_3_prompt(lead, tone), 150),
            _ => bail!("Invalid follow-up sequence: {}", sequence),
        };

        let raw = self.text_client.generate(prompt, max_tokens, 0.7).await?;
        Ok(raw.trim().to_string())
    }

    /// The full preview: subjects and body in parallel, then the three
    /// follow-ups, the first anchored to the chosen subject line.
    pub async fn generate_preview(
        &self,
        lead: &LeadProfile,
        tone: &str,
    ) -> Result<CampaignPreview> {
        let (subjects, body) = tokio::try_join!(
            self.generate_subjects(lead, tone),
            self.generate_body(lead, tone)
        )?;

        let original_subject = subjects[0].clone();
        let (first, second, third) = tokio::try_join!(
            self.generate_follow_up(lead, tone, 1, &original_subject),
            self.generate_follow_up(lead, tone, 2, ""),
            self.generate_follow_up(lead, tone, 3, "")
        )?;

        let follow_ups = vec![
            FollowUpPreview {
                sequence: 1,
                body: first,
            },
            FollowUpPreview {
                sequence: 2,
                body: second,
            },
            FollowUpPreview {
                sequence: 3,
                body: third,
            },
        ];

        Ok(CampaignPreview {
            subjects,
            body,
            follow_ups,
        })
    }
}

/// Whatever the model answered becomes exactly three non-empty subjects,
/// each capped at sixty characters. A JSON array is taken as-is, anything
/// else is split into lines, and missing entries are padded with a
/// personalized fallback.
fn normalize_subjects(raw: &str, lead: &LeadProfile) -> Vec<String> {
    let candidates: Vec<String> = match serde_json::from_str::<Vec<String>>(raw.trim()) {
        Ok(parsed) => parsed,
        Err(_) => raw.lines().map(|line| line.to_string()).collect(),
    };

    let mut subjects: Vec<String> = candidates
        .iter()
        .map(|line| truncate_subject(&clean_subject_line(line)))
        .filter(|subject| !subject.is_empty())
        .take(SUBJECT_COUNT)
        .collect();

    while subjects.len() < SUBJECT_COUNT {
        subjects.push(truncate_subject(&default_subject(lead)));
    }

    subjects
}

fn clean_subject_line(line: &str) -> String {
    let mut line = line.trim();

    // Strip "1." / "2)" style list markers the model sometimes emits.
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 && matches!(line.chars().nth(digits), Some('.') | Some(')')) {
        line = &line[digits + 1..];
    }

    line.trim_start_matches(['-', '*'])
        .trim()
        .trim_end_matches(',')
        .trim_matches('"')
        .trim()
        .to_string()
}

fn truncate_subject(subject: &str) -> String {
    subject
        .chars()
        .take(SUBJECT_MAX_CHARS)
        .collect::<String>()
        .trim_end()
        .to_string()
}

fn default_subject(lead: &LeadProfile) -> String {
    match (&lead.first_name, &lead.company) {
        (Some(first), _) => format!("Quick question, {first}"),
        (None, Some(company)) => format!("An idea for {company}"),
        (None, None) => "Quick question".to_string(),
    }
}

fn lead_context(lead: &LeadProfile) -> String {
    let mut lines = vec![format!("- Recipient: {}", lead.display_name())];
    if let Some(company) = &lead.company {
        lines.push(format!("- Company: {}", company));
    }
    if let Some(title) = &lead.title {
        lines.push(format!("- Title: {}", title));
    }
    lines.join("\n")
}

fn subject_prompt(lead: &LeadProfile, tone: &str) -> String {
    format!(
        "Generate a professional, engaging subject line for a cold email.\n\n\
Context:\n{context}\n- Tone: {tone}\n\n\
Requirements:\n\
- Maximum 60 characters\n\
- Personalized to the recipient\n\
- No spam trigger words (FREE, ACT NOW, etc.)\n\
- Professional and respectful\n\
- Action-oriented but not pushy\n\n\
Generate 3 subject line options as a JSON array.",
        context = lead_context(lead)
    )
}

fn body_prompt(lead: &LeadProfile, tone: &str) -> String {
    format!(
        "Write a professional cold email to introduce a product/service.\n\n\
Recipient Details:\n{context}\n\n\
Email Requirements:\n\
- Tone: {tone}\n\
- Length: 150-200 words maximum\n\
- Structure:\n\
  1. Personalized greeting\n\
  2. Brief introduction (1 sentence about sender)\n\
  3. Value proposition (2-3 sentences)\n\
  4. Social proof or credibility marker (optional, 1 sentence)\n\
  5. Clear call-to-action\n\
  6. Professional sign-off\n\n\
Constraints:\n\
- No hard sales language\n\
- Focus on value, not features\n\
- Respect the recipient's time\n\
- Include one clear, specific call-to-action\n\
- Do NOT ask for sensitive information\n\
- Do NOT make unrealistic promises\n\n\
Generate the email body only (no subject line).",
        context = lead_context(lead)
    )
}

fn follow_up_1_prompt(lead: &LeadProfile, tone: &str, original_subject: &str) -> String {
    format!(
        "Write a brief follow-up email for a cold outreach campaign.\n\n\
Context:\n\
- This is the first follow-up (sent 3 days after initial email)\n\
{context}\n\
- Original subject: {original_subject}\n\
- Tone: {tone}\n\n\
Email Requirements:\n\
- Length: 80-120 words\n\
- Acknowledge they might be busy\n\
- Add one new piece of value\n\
- Softer call-to-action\n\
- No pushy language\n\n\
Constraints:\n\
- Keep it short and respectful\n\
- Different angle from first email\n\
- Professional and patient tone",
        context = lead_context(lead)
    )
}

fn follow_up_2_prompt(lead: &LeadProfile, tone: &str) -> String {
    format!(
        "Write a second follow-up email for a cold outreach campaign.\n\n\
Context:\n\
- This is follow-up #2 (sent 6 days after initial email)\n\
{context}\n\
- Tone: {tone}\n\n\
Email Requirements:\n\
- Length: 60-100 words\n\
- Very brief and humble\n\
- Provide a resource or insight\n\
- Give them an easy \"out\" option\n\
- Show respect for their time\n\n\
Constraints:\n\
- Ultra-brief\n\
- No pressure\n\
- Helpful, not salesy",
        context = lead_context(lead)
    )
}

fn follow_up_3_prompt(lead: &LeadProfile, tone: &str) -> String {
    format!(
        "Write a final follow-up email for a cold outreach campaign.\n\n\
Context:\n\
- This is the final follow-up (sent 9 days after initial email)\n\
{context}\n\
- Tone: {tone}\n\n\
Email Requirements:\n\
- Length: 40-80 words\n\
- Polite close to the sequence\n\
- Thank them for their time\n\
- Leave door open for future\n\
- No hard ask\n\n\
Constraints:\n\
- Graceful exit\n\
- Professional and respectful\n\
- No guilt or pressure",
        context = lead_context(lead)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::repositories::text_generation::MockTextGenerationClient;

    fn sample_lead() -> LeadProfile {
        LeadProfile {
            email: "jordan@acme.io".to_string(),
            first_name: Some("Jordan".to_string()),
            last_name: Some("Reyes".to_string()),
            company: Some("Acme".to_string()),
            title: Some("VP Operations".to_string()),
        }
    }

    #[test]
    fn json_array_output_is_used_verbatim() {
        let raw = r#"["Scaling Acme's outreach", "A question for Jordan", "Worth a look?"]"#;
        let subjects = normalize_subjects(raw, &sample_lead());

        assert_eq!(
            subjects,
            vec![
                "Scaling Acme's outreach".to_string(),
                "A question for Jordan".to_string(),
                "Worth a look?".to_string(),
            ]
        );
    }

    #[test]
    fn ragged_text_output_falls_back_to_lines() {
        let raw = "1. \"Scaling Acme's outreach\",\n2) A question for Jordan\n- Worth a look?\nExtra line that is dropped";
        let subjects = normalize_subjects(raw, &sample_lead());

        assert_eq!(subjects.len(), SUBJECT_COUNT);
        assert_eq!(subjects[0], "Scaling Acme's outreach");
        assert_eq!(subjects[1], "A question for Jordan");
        assert_eq!(subjects[2], "Worth a look?");
    }

    #[test]
    fn empty_output_pads_with_personalized_defaults() {
        let subjects = normalize_subjects("", &sample_lead());

        assert_eq!(subjects.len(), SUBJECT_COUNT);
        for subject in &subjects {
            assert_eq!(subject, "Quick question, Jordan");
        }
    }

    #[test]
    fn overlong_subjects_are_truncated() {
        let raw = format!("[\"{}\"]", "An enormously long subject line that keeps going well past any sane inbox width");
        let subjects = normalize_subjects(&raw, &sample_lead());

        assert!(subjects.iter().all(|s| s.chars().count() <= SUBJECT_MAX_CHARS));
        assert!(!subjects[0].is_empty());
    }

    #[tokio::test]
    async fn invalid_follow_up_sequence_is_rejected() {
        let client = MockTextGenerationClient::new();
        let generator = ContentGeneratorUseCase::new(Arc::new(client));

        let result = generator
            .generate_follow_up(&sample_lead(), "professional", 4, "")
            .await;

        let error = result.unwrap_err().to_string();
        assert!(error.contains("Invalid follow-up sequence"));
    }

    #[tokio::test]
    async fn first_follow_up_prompt_references_the_original_subject() {
        let mut client = MockTextGenerationClient::new();
        client
            .expect_generate()
            .withf(|prompt, max_tokens, _| {
                prompt.contains("Original subject: Scaling Acme's outreach") && *max_tokens == 250
            })
            .returning(|_, _, _| Box::pin(async { Ok("Just floating this back up.".to_string()) }));

        let generator = ContentGeneratorUseCase::new(Arc::new(client));
        let body = generator
            .generate_follow_up(&sample_lead(), "professional", 1, "Scaling Acme's outreach")
            .await
            .unwrap();

        assert_eq!(body, "Just floating this back up.");
    }

    #[tokio::test]
    async fn preview_carries_three_follow_ups_in_sequence_order() {
        let mut client = MockTextGenerationClient::new();
        client
            .expect_generate()
            .returning(|_, max_tokens, _| {
                Box::pin(async move {
                    Ok(match max_tokens {
                        100 => r#"["One", "Two", "Three"]"#.to_string(),
                        400 => "Hi Jordan, quick note about Acme.".to_string(),
                        250 => "Follow-up one.".to_string(),
                        200 => "Follow-up two.".to_string(),
                        _ => "Follow-up three.".to_string(),
                    })
                })
            });

        let generator = ContentGeneratorUseCase::new(Arc::new(client));
        let preview = generator
            .generate_preview(&sample_lead(), "friendly")
            .await
            .unwrap();

        assert_eq!(preview.subjects, vec!["One", "Two", "Three"]);
        assert_eq!(preview.body, "Hi Jordan, quick note about Acme.");
        assert_eq!(
            preview.follow_ups.iter().map(|f| f.sequence).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(preview.follow_ups[0].body, "Follow-up one.");
        assert_eq!(preview.follow_ups[2].body, "Follow-up three.");
    }
}
