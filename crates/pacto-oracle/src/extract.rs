//! Extraction adapter — prompts, validated response schemas, and the
//! failure-to-empty policy.
//!
//! Every oracle failure or schema mismatch degrades to an empty result;
//! callers read "empty" as "I didn't understand" and never see the error.

use chrono::NaiveDate;
use pacto_core::model::{Goal, ProgressRecord};
use pacto_core::traits::Oracle;
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

/// Comment used when the oracle omits the motivational line.
const COMMENT_FALLBACK: &str = "Registrado!";

/// One analyzed goal outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisItem {
    pub name: String,
    pub completed: bool,
}

/// Result of analyzing a progress report against known goals.
#[derive(Debug, Clone)]
pub struct ProgressAnalysis {
    pub items: Vec<AnalysisItem>,
    pub comment: String,
}

impl ProgressAnalysis {
    fn empty() -> Self {
        Self {
            items: Vec::new(),
            comment: COMMENT_FALLBACK.to_string(),
        }
    }
}

// Wire schemas — the JSON shapes the oracle is prompted to produce.

#[derive(Deserialize)]
struct ExtractionWire {
    metas: Vec<String>,
}

#[derive(Deserialize)]
struct AnalysisWire {
    analise: Vec<AnalysisItemWire>,
    #[serde(default)]
    comentario_motivacional: Option<String>,
}

#[derive(Deserialize)]
struct AnalysisItemWire {
    meta: String,
    concluido: bool,
}

#[derive(Deserialize)]
struct ReportWire {
    relatorio: String,
}

/// Wraps the oracle with fixed prompts and validating parses.
pub struct Extractor {
    oracle: Arc<dyn Oracle>,
}

impl Extractor {
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self { oracle }
    }

    /// Extract a goal list from free text. Empty on any failure.
    pub async fn extract_goals(&self, text: &str) -> Vec<String> {
        let prompt = format!(
            "O usuário está listando metas pessoais que deseja acompanhar.\n\
             Analise o texto: \"{text}\"\n\n\
             Retorne um JSON com uma lista de strings contendo as metas identificadas.\n\
             Se o texto não contiver nenhuma meta, retorne a lista vazia.\n\
             Formato exato esperado:\n\
             {{ \"metas\": [\"Ler 10 páginas\", \"Ir na academia\"] }}"
        );

        let raw = match self.oracle.generate(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("extract_goals: oracle failed: {e}");
                return Vec::new();
            }
        };

        match serde_json::from_str::<ExtractionWire>(strip_code_fence(&raw)) {
            Ok(wire) => wire
                .metas
                .into_iter()
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .collect(),
            Err(e) => {
                warn!("extract_goals: bad oracle payload: {e}");
                Vec::new()
            }
        }
    }

    /// Analyze a day's report against the user's known goal names.
    /// Empty item list on any failure; comment falls back to a fixed string.
    pub async fn analyze_progress(&self, text: &str, goal_names: &[String]) -> ProgressAnalysis {
        let names_json = serde_json::to_string(goal_names).unwrap_or_else(|_| "[]".to_string());
        let prompt = format!(
            "Você é um assistente de responsabilidade (accountability).\n\n\
             Lista de metas do usuário: {names_json}\n\
             Relato do dia do usuário: \"{text}\"\n\n\
             Analise o relato e determine, para cada meta mencionada, se ela foi \
             concluída (true) ou não (false). Inclua apenas metas sobre as quais o \
             relato diz algo.\n\n\
             Retorne um JSON com o seguinte formato exato:\n\
             {{\n\
                 \"analise\": [\n\
                     {{ \"meta\": \"Nome da Meta\", \"concluido\": true }}\n\
                 ],\n\
                 \"comentario_motivacional\": \"Uma frase curta e humana comentando o desempenho.\"\n\
             }}"
        );

        let raw = match self.oracle.generate(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("analyze_progress: oracle failed: {e}");
                return ProgressAnalysis::empty();
            }
        };

        match serde_json::from_str::<AnalysisWire>(strip_code_fence(&raw)) {
            Ok(wire) => ProgressAnalysis {
                items: wire
                    .analise
                    .into_iter()
                    .map(|item| AnalysisItem {
                        name: item.meta,
                        completed: item.concluido,
                    })
                    .collect(),
                comment: wire
                    .comentario_motivacional
                    .filter(|c| !c.trim().is_empty())
                    .unwrap_or_else(|| COMMENT_FALLBACK.to_string()),
            },
            Err(e) => {
                warn!("analyze_progress: bad oracle payload: {e}");
                ProgressAnalysis::empty()
            }
        }
    }

    /// Generate the monthly narrative for one user. `None` on any failure —
    /// the reporting job skips the user and moves on.
    pub async fn monthly_report(
        &self,
        user_name: &str,
        goals: &[Goal],
        progress: &[ProgressRecord],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Option<String> {
        let goal_lines: String = goals
            .iter()
            .map(|g| format!("- {} ({})\n", g.description, g.category.as_str()))
            .collect();
        let progress_lines: String = progress
            .iter()
            .map(|p| {
                format!(
                    "- {} — {}: {}\n",
                    p.date.format("%Y-%m-%d"),
                    p.description,
                    if p.achieved { "concluída" } else { "não concluída" }
                )
            })
            .collect();

        let prompt = format!(
            "Você é um assistente de responsabilidade (accountability).\n\
             Escreva o relatório mensal de desempenho de {user_name} para o período \
             de {from} a {to}.\n\n\
             Metas cadastradas:\n{goal_lines}\n\
             Registros do período:\n{progress_lines}\n\
             Escreva um texto curto (até 6 frases), em português, celebrando os \
             acertos e apontando onde melhorar no próximo mês.\n\n\
             Retorne um JSON com o formato exato:\n\
             {{ \"relatorio\": \"texto do relatório\" }}",
            from = from.format("%d/%m/%Y"),
            to = to.format("%d/%m/%Y"),
        );

        let raw = match self.oracle.generate(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("monthly_report: oracle failed: {e}");
                return None;
            }
        };

        match serde_json::from_str::<ReportWire>(strip_code_fence(&raw)) {
            Ok(wire) if !wire.relatorio.trim().is_empty() => Some(wire.relatorio),
            Ok(_) => None,
            Err(e) => {
                warn!("monthly_report: bad oracle payload: {e}");
                None
            }
        }
    }
}

/// Strip a markdown code fence the model sometimes wraps around JSON,
/// even with a JSON response type requested.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}
