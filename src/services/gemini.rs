use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::catalog::model::{Event, EventCategory};
use crate::catalog::towns;
use crate::error::{AppError, AppResult};

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Client for the Gemini generateContent endpoint. Calls run with the caller's
/// own API key when one is supplied, falling back to the server-side key.
#[derive(Debug, Clone)]
pub struct GeminiService {
    client: Client,
    model: String,
    server_api_key: Option<String>,
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

// ============================================================================
// Search Intent Types
// ============================================================================

/// Structured filter extracted from a free-text search. Town names come back
/// from the model as display names and are mapped to registry ids here; names
/// it invents are dropped.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchIntent {
    pub town_ids: Vec<String>,
    pub categories: Vec<EventCategory>,
    pub keywords: Vec<String>,
    /// False when the query is a plain town or category lookup and plain text
    /// search would do just as well.
    pub is_complex: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSearchIntent {
    #[serde(default)]
    town_ids: Vec<String>,
    #[serde(default)]
    categories: Vec<String>,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    is_complex: bool,
}

impl GeminiService {
    pub fn new(model: String, server_api_key: Option<String>) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Internal(e.into()))?;

        Ok(Self {
            client,
            model,
            server_api_key,
        })
    }

    fn resolve_key<'a>(&'a self, client_key: Option<&'a str>) -> AppResult<&'a str> {
        client_key
            .filter(|k| !k.trim().is_empty())
            .or(self.server_api_key.as_deref())
            .ok_or(AppError::MissingApiKey)
    }

    async fn generate(
        &self,
        api_key: &str,
        request: &GenerateContentRequest,
    ) -> AppResult<Option<String>> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            GEMINI_API_URL, self.model, api_key
        );

        let response = self.client.post(url).json(request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS
                || error_text.contains("RESOURCE_EXHAUSTED")
            {
                return Err(AppError::QuotaExceeded);
            }
            if error_text.contains("API key not valid") || error_text.contains("API_KEY_INVALID") {
                return Err(AppError::InvalidApiKey);
            }
            return Err(AppError::AiService(format!(
                "generateContent failed ({}): {}",
                status, error_text
            )));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AppError::AiService(format!("Failed to parse Gemini response: {}", e)))?;

        let text = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .map(|p| p.text.trim().to_string())
            .filter(|t| !t.is_empty());

        Ok(text)
    }

    // ========================================================================
    // Search Intent
    // ========================================================================

    /// Classify a free-text search into a structured filter. A model reply we
    /// cannot parse is treated as "no intent", never as an error; the caller
    /// falls back to plain text search.
    pub async fn analyze_search_intent(
        &self,
        query: &str,
        client_key: Option<&str>,
    ) -> AppResult<Option<SearchIntent>> {
        if query.trim().is_empty() {
            return Ok(None);
        }
        let api_key = self.resolve_key(client_key)?;

        let town_names: Vec<&str> = towns::TOWNS.iter().map(|t| t.name).collect();
        let category_labels: Vec<&str> =
            EventCategory::ALL.iter().map(|c| c.label()).collect();

        let system_instruction = format!(
            "Eres un motor de búsqueda inteligente para una agenda cultural en la Sierra de Huelva.\n\
             Tu trabajo es interpretar la búsqueda del usuario y devolver un filtro estructurado JSON.\n\n\
             Tus herramientas son:\n\
             1. Lista de pueblos disponibles: {}.\n\
             2. Categorías disponibles: {}.\n\n\
             Reglas:\n\
             - Si el usuario menciona un pueblo (o parecido), añádelo a 'townIds' (usa el nombre exacto de la lista).\n\
             - Si el usuario busca un tipo de evento (ej: \"música\", \"comer\", \"belén\"), asígnalo a la 'categories' más adecuada.\n\
             - Extrae palabras clave importantes (ej: \"gratis\", \"infantil\", \"noche\") en 'keywords'.\n\
             - Si la búsqueda es muy simple (ej: solo una palabra que parece un pueblo o categoría), marca 'isComplex': false.\n\
             - Si la búsqueda requiere entender contexto (ej: \"planes con niños\", \"fiesta de nochevieja\"), marca 'isComplex': true.",
            town_names.join(", "),
            category_labels.join(", ")
        );

        let schema = serde_json::json!({
            "type": "OBJECT",
            "properties": {
                "townIds": {
                    "type": "ARRAY",
                    "items": { "type": "STRING" },
                    "description": "Nombres de los pueblos detectados."
                },
                "categories": {
                    "type": "ARRAY",
                    "items": { "type": "STRING", "enum": category_labels },
                    "description": "Categorías detectadas."
                },
                "keywords": {
                    "type": "ARRAY",
                    "items": { "type": "STRING" },
                    "description": "Palabras clave adicionales para búsqueda de texto."
                },
                "isComplex": {
                    "type": "BOOLEAN",
                    "description": "True si es una búsqueda semántica compleja, False si es simple."
                }
            }
        });

        let request = GenerateContentRequest {
            system_instruction: Some(Content {
                parts: vec![Part {
                    text: system_instruction,
                }],
            }),
            contents: vec![Content {
                parts: vec![Part {
                    text: format!("Analiza esta búsqueda: \"{}\"", query),
                }],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(schema),
            }),
        };

        let Some(text) = self.generate(api_key, &request).await? else {
            return Ok(None);
        };

        let raw: RawSearchIntent = match serde_json::from_str(&text) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Unparseable search intent from model: {}", e);
                return Ok(None);
            }
        };

        Ok(Some(map_search_intent(raw)))
    }

    // ========================================================================
    // Plan Generation
    // ========================================================================

    /// Generate a markdown day-by-day plan from the user's request, grounded
    /// only in the provided event data.
    pub async fn generate_plan(
        &self,
        query: &str,
        events: &[Event],
        client_key: Option<&str>,
    ) -> AppResult<String> {
        let api_key = self.resolve_key(client_key)?;

        let system_instruction = "\
            Eres un asistente de viajes experto y amigable, especializado en la Sierra de Aracena y Picos de Aroche (Huelva).\n\
            Tu misión es crear planes de viaje personalizados para los usuarios basándote EXCLUSIVAMENTE en la lista de eventos en formato JSON que te proporciono.\n\
            - NO uses conocimiento externo. NO busques en internet. Toda tu información debe provenir del JSON.\n\
            - Analiza la petición del usuario para entender las fechas y los intereses.\n\
            - Filtra la lista de eventos para encontrar los que coincidan con la petición.\n\
            - Utiliza los campos 'itinerary' e 'interestInfo' de los eventos para enriquecer el plan.\n\
            - Organiza el plan día por día en formato Markdown, usando negritas (**texto**) para resaltar los nombres de los eventos y lugares.\n\
            - Si no encuentras ningún evento en el JSON que coincida con la petición del usuario, informa amablemente de que no tienes datos para esas fechas o consulta.\n\
            - No menciones que estás usando un JSON. Habla como un experto local.";

        let events_json = serde_json::to_string_pretty(events)
            .map_err(|e| AppError::Internal(e.into()))?;

        let prompt = format!(
            "Petición del usuario: \"{}\"\n\n\
             Contexto (datos de eventos disponibles en formato JSON):\n\
             ---\n\
             {}\n\
             ---",
            query, events_json
        );

        let request = GenerateContentRequest {
            system_instruction: Some(Content {
                parts: vec![Part {
                    text: system_instruction.to_string(),
                }],
            }),
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: None,
        };

        let text = self.generate(api_key, &request).await?;
        Ok(text.unwrap_or_else(|| {
            "No he podido generar un plan en este momento. Inténtalo de nuevo.".to_string()
        }))
    }
}

fn map_search_intent(raw: RawSearchIntent) -> SearchIntent {
    let town_ids = raw
        .town_ids
        .iter()
        .filter_map(|name| towns::resolve(name))
        .map(|t| t.id.to_string())
        .collect();

    let categories = raw
        .categories
        .iter()
        .filter_map(|label| EventCategory::from_label(label))
        .collect();

    SearchIntent {
        town_ids,
        categories,
        keywords: raw.keywords,
        is_complex: raw.is_complex,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_intent_resolves_town_names_to_ids() {
        let raw = RawSearchIntent {
            town_ids: vec!["Galaroza".to_string(), "Castaño del Robledo".to_string()],
            categories: vec!["Belén Viviente".to_string()],
            keywords: vec!["gratis".to_string()],
            is_complex: true,
        };

        let intent = map_search_intent(raw);
        assert_eq!(intent.town_ids, vec!["galaroza", "castano"]);
        assert_eq!(intent.categories, vec![EventCategory::BelenViviente]);
        assert_eq!(intent.keywords, vec!["gratis"]);
        assert!(intent.is_complex);
    }

    #[test]
    fn test_map_intent_drops_unknown_values() {
        let raw = RawSearchIntent {
            town_ids: vec!["Sevilla".to_string(), "Aracena".to_string()],
            categories: vec!["Conciertos".to_string()],
            keywords: vec![],
            is_complex: false,
        };

        let intent = map_search_intent(raw);
        assert_eq!(intent.town_ids, vec!["aracena"]);
        assert!(intent.categories.is_empty());
        assert!(!intent.is_complex);
    }

    #[test]
    fn test_missing_key_is_rejected() {
        let svc = GeminiService::new("gemini-2.5-flash".to_string(), None).unwrap();
        assert!(matches!(svc.resolve_key(None), Err(AppError::MissingApiKey)));
        assert!(matches!(svc.resolve_key(Some("  ")), Err(AppError::MissingApiKey)));
        assert_eq!(svc.resolve_key(Some("abc")).unwrap(), "abc");
    }
}
