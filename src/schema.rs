//! Request schemas
//!
//! The employee record mirrors the schema the model was trained against.
//! All fields are required; extra fields in the raw JSON are accepted and
//! later dropped by the feature aligner.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub age: i64,
    pub genre: String,
    pub revenu_mensuel: i64,
    pub statut_marital: String,
    pub departement: String,
    pub poste: String,
    pub nombre_experiences_precedentes: i64,
    pub annees_dans_le_poste_actuel: i64,
    pub note_evaluation_precedente: i64,
    pub note_evaluation_actuelle: i64,
    pub heure_supplementaires: i64,
    pub augementation_salaire_precedente: i64,
    pub nombre_participation_pee: i64,
    pub nb_formations_suivies: i64,
    pub distance_domicile_travail: i64,
    pub niveau_education: i64,
    pub annees_depuis_la_derniere_promotion: i64,
    pub annes_sous_responsable_actuel: i64,
    pub satisfaction_globale: f64,
    pub exp_moins_3_years: i64,
    pub domaine_etude: String,
    pub frequence_deplacement: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictRequest {
    pub inputs: Vec<EmployeeRecord>,
}
