use crate::config::MatchingThresholds;
use crate::matching::profile::CandidateProfile;
use crate::matching::tiers::MatchTier;
use crate::posting::Posting;
use crate::types::score::{ScoreResult, FEW_KEYWORDS, NO_WEAKNESS};

const POSITIVE_POINTS: i32 = 5;
const POSITIVE_CAP: i32 = 40;
const NEGATIVE_POINTS: i32 = 10;
const NEGATIVE_CAP: i32 = 30;
const PREFERRED_LOCATION_POINTS: i32 = 20;
const ACCEPTABLE_LOCATION_POINTS: i32 = 10;
const OTHER_LOCATION_PENALTY: i32 = 5;
const SKILL_POINTS: i32 = 3;
const SKILL_CAP: i32 = 20;
const PRIMARY_DOMAIN_POINTS: i32 = 15;
const SECONDARY_DOMAIN_POINTS: i32 = 8;

pub trait Scorer {
    fn score(&self, posting: &Posting, profile: &CandidateProfile) -> ScoreResult;
}

/// v0: keyword, location, skill and domain rules over substring matches.
///
/// Pure: no I/O, no clock, no randomness. Rules run in a fixed order so that
/// strengths and weaknesses come out in a reproducible order; the total does
/// not depend on it.
#[derive(Debug, Clone)]
pub struct ProfileScorer {
    thresholds: MatchingThresholds,
}

impl ProfileScorer {
    pub fn new(thresholds: MatchingThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &MatchingThresholds {
        &self.thresholds
    }
}

impl Scorer for ProfileScorer {
    fn score(&self, posting: &Posting, profile: &CandidateProfile) -> ScoreResult {
        let text = [
            posting.title.as_str(),
            posting.description.as_str(),
            posting.lab.as_str(),
        ]
        .join(" ")
        .to_lowercase();

        let mut total: i32 = 0;
        let mut strengths = Vec::new();
        let mut weaknesses = Vec::new();

        // 1. Positive keywords
        let positives = matched(&profile.positive_keywords, &text);
        if !positives.is_empty() {
            total += capped(positives.len(), POSITIVE_POINTS, POSITIVE_CAP);
            strengths.push(format!(
                "Mots-clés pertinents trouvés: {}",
                positives.iter().take(5).cloned().collect::<Vec<_>>().join(", ")
            ));
        }

        // 2. Negative keywords
        let negatives = matched(&profile.negative_keywords, &text);
        if !negatives.is_empty() {
            total -= capped(negatives.len(), NEGATIVE_POINTS, NEGATIVE_CAP);
            weaknesses.push(format!("Domaines non souhaités: {}", negatives.join(", ")));
        }

        // 3. Location; an unset location is neutral
        if let Some(location) = posting.location() {
            let place = location.to_lowercase();
            if any_within(&profile.location.preferred, &place) {
                total += PREFERRED_LOCATION_POINTS;
                strengths.push(format!("Localisation préférée: {location}"));
            } else if any_within(&profile.location.acceptable, &place) {
                total += ACCEPTABLE_LOCATION_POINTS;
                strengths.push(format!("Localisation acceptable: {location}"));
            } else {
                total -= OTHER_LOCATION_PENALTY;
                weaknesses.push(format!("Localisation non prioritaire: {location}"));
            }
        }

        // 4. Skills
        let skills = lowered(matched(&profile.skills, &text));
        if !skills.is_empty() {
            total += capped(skills.len(), SKILL_POINTS, SKILL_CAP);
            strengths.push(format!(
                "Compétences requises correspondantes: {}",
                skills.iter().take(3).cloned().collect::<Vec<_>>().join(", ")
            ));
        }

        // 5. Domains; primary suppresses secondary
        let primary = lowered(matched(&profile.domains.primary, &text));
        if !primary.is_empty() {
            total += PRIMARY_DOMAIN_POINTS;
            strengths.push(format!("Domaine principal d'intérêt: {}", primary.join(", ")));
        } else {
            let secondary = lowered(matched(&profile.domains.secondary, &text));
            if !secondary.is_empty() {
                total += SECONDARY_DOMAIN_POINTS;
                strengths.push(format!(
                    "Domaine secondaire d'intérêt: {}",
                    secondary.join(", ")
                ));
            }
        }

        // 6. Clamp
        let score = total.clamp(0, 100) as u8;

        // 7. Tier
        let tier = MatchTier::for_score(score, &self.thresholds);

        // 8. Weaknesses are never empty
        if strengths.is_empty() {
            weaknesses.push(FEW_KEYWORDS.to_string());
        }
        if weaknesses.is_empty() {
            weaknesses.push(NO_WEAKNESS.to_string());
        }

        debug_assert!(score <= 100, "score {score} out of range [0, 100]");

        ScoreResult {
            score,
            justification: tier.message().to_string(),
            strengths,
            weaknesses,
        }
    }
}

/// Distinct terms (case-insensitive) occurring in `text`, in profile order and
/// as spelled in the profile. `text` must already be lowercased.
fn matched(terms: &[String], text: &str) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut found = Vec::new();
    for term in terms {
        let key = term.trim().to_lowercase();
        if key.is_empty() || seen.contains(&key) {
            continue;
        }
        if text.contains(key.as_str()) {
            found.push(term.trim().to_string());
        }
        seen.push(key);
    }
    found
}

fn any_within(terms: &[String], place: &str) -> bool {
    terms.iter().any(|term| {
        let term = term.trim().to_lowercase();
        !term.is_empty() && place.contains(term.as_str())
    })
}

fn lowered(terms: Vec<String>) -> Vec<String> {
    terms.into_iter().map(|t| t.to_lowercase()).collect()
}

fn capped(count: usize, points: i32, cap: i32) -> i32 {
    let count = i32::try_from(count).unwrap_or(i32::MAX);
    count.saturating_mul(points).min(cap)
}
