//! Prompt sent to the model for one industry.

/// Build the insight prompt for `industry`.
///
/// The model is asked for exactly the JSON shape that [`super::parse_insights`] accepts.
pub fn build_prompt(industry: &str) -> String {
    format!(
        r#"
Analyze the current state of the {industry} industry and provide insights in ONLY the following JSON format without any additional notes or explanations:
{{
  "salaryRanges": [
    {{ "role": "string", "min": number, "max": number, "median": number, "location": "string" }}
  ],
  "growthRate": number,
  "demandLevel": "High" | "Medium" | "Low",
  "topSkills": ["skill1", "skill2"],
  "marketOutlook": "Positive" | "Neutral" | "Negative",
  "keyTrends": ["trend1", "trend2"],
  "recommendedSkills": ["skill1", "skill2"]
}}

IMPORTANT: Return ONLY the JSON. No additional text, notes, or markdown formatting.
Include at least 5 common roles for salary ranges.
Growth rate should be a percentage.
Include at least 5 skills and trends.
"#,
        industry = industry
    )
}
