//! API documentation handlers

use axum::response::{Html, Redirect};

pub async fn root() -> Redirect {
    Redirect::permanent("/docs")
}

pub async fn docs() -> Html<&'static str> {
    Html(DOCS_HTML)
}

const DOCS_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Attrition API</title>
  <style>
    body { font-family: sans-serif; max-width: 52rem; margin: 2rem auto; padding: 0 1rem; }
    code, pre { background: #f4f4f4; padding: 0.15rem 0.3rem; border-radius: 3px; }
    pre { padding: 0.75rem; overflow-x: auto; }
  </style>
</head>
<body>
  <h1>Attrition API</h1>
  <p>Scores employee records against a pre-trained attrition classifier.</p>

  <h2>GET /health</h2>
  <p>Process status, active model source, decision threshold and audit store state.</p>

  <h2>POST /predict_one</h2>
  <p>Body: one employee record. Response: <code>{"threshold": 0.33, "proba": 0.14, "pred": 0}</code>.
     Returns 400 with a descriptive message when the record cannot be scored.</p>
  <pre>{
  "age": 41, "genre": "F", "revenu_mensuel": 6000,
  "statut_marital": "Célibataire", "departement": "Consulting", "poste": "Consultant",
  "nombre_experiences_precedentes": 6, "annees_dans_le_poste_actuel": 2,
  "note_evaluation_precedente": 3, "note_evaluation_actuelle": 3,
  "heure_supplementaires": 0, "augementation_salaire_precedente": 12,
  "nombre_participation_pee": 1, "nb_formations_suivies": 2,
  "distance_domicile_travail": 5, "niveau_education": 2,
  "annees_depuis_la_derniere_promotion": 1, "annes_sous_responsable_actuel": 2,
  "satisfaction_globale": 3.0, "exp_moins_3_years": 0,
  "domaine_etude": "Infra &amp; Cloud", "frequence_deplacement": "Occasionnel"
}</pre>

  <h2>POST /predict_proba</h2>
  <p>Body: <code>{"inputs": [record, ...]}</code>. Response:
     <code>{"threshold": 0.33, "probas": [...], "preds": [...]}</code>, order-preserving.
     A single unscorable row rejects the whole batch with 400.</p>
</body>
</html>
"#;
