//! Prediction handlers

use axum::extract::rejection::JsonRejection;
use axum::{extract::State, Json};
use serde_json::{Map, Value};

use crate::model::{BatchScoring, Scoring};
use crate::schema::{EmployeeRecord, PredictRequest};
use crate::{AppError, AppResult, AppState};

/// Score one employee record
pub async fn predict_one(
    State(state): State<AppState>,
    payload: Result<Json<EmployeeRecord>, JsonRejection>,
) -> AppResult<Json<Scoring>> {
    let Json(employee) = payload.map_err(|e| AppError::ValidationError(e.body_text()))?;
    let record = to_record(&employee)?;
    let scoring = state.scorer.score_one(&record)?;
    Ok(Json(scoring))
}

/// Score an ordered batch of employee records
pub async fn predict_proba(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> AppResult<Json<BatchScoring>> {
    let Json(request) = payload.map_err(|e| AppError::ValidationError(e.body_text()))?;
    let records = request
        .inputs
        .iter()
        .map(to_record)
        .collect::<Result<Vec<_>, _>>()?;
    let batch = state.scorer.score_batch(&records)?;
    Ok(Json(batch))
}

fn to_record(employee: &EmployeeRecord) -> Result<Map<String, Value>, AppError> {
    let value =
        serde_json::to_value(employee).map_err(|e| AppError::InternalError(e.to_string()))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(AppError::InternalError(
            "employee record did not serialize to an object".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use ndarray::Array2;
    use serde_json::json;
    use tower::ServiceExt;

    use crate::create_router;
    use crate::db::AuditLogger;
    use crate::model::{Classifier, ModelMeta, ScoringError, ScoringService};
    use crate::AppState;

    /// Stub classifier: probability is age / 100.
    struct StubClassifier;

    impl Classifier for StubClassifier {
        fn predict_proba(&self, rows: Array2<f32>) -> Result<Vec<f64>, ScoringError> {
            Ok(rows
                .rows()
                .into_iter()
                .map(|row| (f64::from(row[0]) / 100.0).clamp(0.0, 1.0))
                .collect())
        }
    }

    fn meta() -> ModelMeta {
        serde_json::from_value(json!({
            "feature_columns": [
                "age", "genre", "revenu_mensuel", "statut_marital", "departement", "poste",
                "nombre_experiences_precedentes", "annees_dans_le_poste_actuel",
                "note_evaluation_precedente", "note_evaluation_actuelle",
                "heure_supplementaires", "augementation_salaire_precedente",
                "nombre_participation_pee", "nb_formations_suivies",
                "distance_domicile_travail", "niveau_education",
                "annees_depuis_la_derniere_promotion", "annes_sous_responsable_actuel",
                "satisfaction_globale", "exp_moins_3_years", "domaine_etude",
                "frequence_deplacement"
            ],
            "categories": {
                "genre": ["F", "M"],
                "statut_marital": ["Célibataire", "Marié"],
                "departement": ["Consulting", "RH"],
                "poste": ["Consultant", "Manager"],
                "domaine_etude": ["Infra & Cloud", "Data"],
                "frequence_deplacement": ["Aucun", "Occasionnel", "Frequent"]
            },
            "version": "rf_reg@v1"
        }))
        .unwrap()
    }

    fn test_app() -> axum::Router {
        let scorer =
            ScoringService::new(Box::new(StubClassifier), meta(), Arc::new(AuditLogger::disabled()));
        create_router(AppState {
            scorer: Arc::new(scorer),
            model_source: "models/model.onnx".to_string(),
        })
    }

    fn employee() -> serde_json::Value {
        json!({
            "age": 41,
            "genre": "F",
            "revenu_mensuel": 6000,
            "statut_marital": "Célibataire",
            "departement": "Consulting",
            "poste": "Consultant",
            "nombre_experiences_precedentes": 6,
            "annees_dans_le_poste_actuel": 2,
            "note_evaluation_precedente": 3,
            "note_evaluation_actuelle": 3,
            "heure_supplementaires": 0,
            "augementation_salaire_precedente": 12,
            "nombre_participation_pee": 1,
            "nb_formations_suivies": 2,
            "distance_domicile_travail": 5,
            "niveau_education": 2,
            "annees_depuis_la_derniere_promotion": 1,
            "annes_sous_responsable_actuel": 2,
            "satisfaction_globale": 3.0,
            "exp_moins_3_years": 0,
            "domaine_etude": "Infra & Cloud",
            "frequence_deplacement": "Occasionnel"
        })
    }

    fn post(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_threshold_and_audit_state() {
        let response = test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["threshold"], 0.33);
        assert_eq!(body["database"], "disabled");
        assert_eq!(body["model_source"], "models/model.onnx");
    }

    #[tokio::test]
    async fn predict_one_scores_a_valid_record() {
        let response = test_app()
            .oneshot(post("/predict_one", employee()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["threshold"], 0.33);
        let proba = body["proba"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&proba));
        let pred = body["pred"].as_i64().unwrap();
        assert_eq!(pred, i64::from(proba >= 0.33));
    }

    #[tokio::test]
    async fn predict_one_rejects_unseen_category_as_client_error() {
        let mut record = employee();
        record["genre"] = json!("X");

        let response = test_app().oneshot(post("/predict_one", record)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        let message = body["error"].as_str().unwrap();
        assert!(message.contains("genre"));
    }

    #[tokio::test]
    async fn predict_one_rejects_missing_schema_field() {
        let mut record = employee();
        record.as_object_mut().unwrap().remove("age");

        let response = test_app().oneshot(post("/predict_one", record)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("age"));
    }

    #[tokio::test]
    async fn predict_one_ignores_extra_fields() {
        let mut record = employee();
        record["commentaire"] = json!("n/a");

        let response = test_app().oneshot(post("/predict_one", record)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn predict_proba_preserves_order() {
        let mut senior = employee();
        senior["age"] = json!(90);

        let response = test_app()
            .oneshot(post("/predict_proba", json!({ "inputs": [senior, employee()] })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let probas = body["probas"].as_array().unwrap();
        let preds = body["preds"].as_array().unwrap();
        assert_eq!(probas.len(), 2);
        assert_eq!(preds.len(), 2);
        assert!(probas[0].as_f64().unwrap() > probas[1].as_f64().unwrap());
        assert_eq!(preds[0], json!(1));
    }

    #[tokio::test]
    async fn predict_proba_empty_batch_returns_empty_lists() {
        let response = test_app()
            .oneshot(post("/predict_proba", json!({ "inputs": [] })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["probas"], json!([]));
        assert_eq!(body["preds"], json!([]));
        assert_eq!(body["threshold"], 0.33);
    }

    #[tokio::test]
    async fn predict_proba_rejects_whole_batch_on_one_bad_row() {
        let mut bad = employee();
        bad["departement"] = json!("Inconnu");

        let response = test_app()
            .oneshot(post("/predict_proba", json!({ "inputs": [employee(), bad] })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn root_redirects_to_docs() {
        let response = test_app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.status().is_redirection());
        assert_eq!(response.headers()[header::LOCATION], "/docs");
    }
}
