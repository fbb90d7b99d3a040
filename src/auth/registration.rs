use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::resource::FieldErrors;
use crate::resources::{parse_date, required};

pub const MINIMUM_AGE: i32 = 16;

pub const ID_TYPES: &[&str] = &[
    "Cédula de ciudadanía",
    "Tarjeta de identidad",
    "Cédula de extranjería",
    "Pasaporte",
];

/// Sign-up form as posted by `/registro`
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RegistrationForm {
    #[validate(custom(function = "required", message = "El nombre es requerido"))]
    pub nombre: String,
    #[validate(custom(function = "required", message = "El apellido es requerido"))]
    pub apellido: String,
    #[validate(custom(
        function = "required",
        message = "El tipo de identificación es requerido"
    ))]
    pub tipo_identificacion: String,
    #[validate(custom(
        function = "required",
        message = "El número de identificación es requerido"
    ))]
    pub numero_identificacion: String,
    pub fecha_nacimiento: String,
    #[validate(email(message = "Ingresa un correo electrónico válido"))]
    pub correo: String,
    #[validate(custom(function = "required", message = "El teléfono es requerido"))]
    pub telefono: String,
    #[validate(length(min = 6, message = "La contraseña debe tener al menos 6 caracteres"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Las contraseñas no coinciden"))]
    pub confirmar_password: String,
    /// Checkbox; browsers send "on" when ticked and nothing otherwise
    pub acepta_terminos: Option<String>,
}

/// Body of `POST /api/personas`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPersona {
    pub nombre: String,
    pub apellido: String,
    pub tipo_identificacion: String,
    pub numero_identificacion: String,
    pub fecha_nacimiento: String,
    pub correo: String,
    pub telefono: String,
}

/// Whole years between `birth` and `today`
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    years
}

impl RegistrationForm {
    /// Every field check, with the age computed as of `today`
    pub fn check(&self, today: NaiveDate) -> Result<(), FieldErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => FieldErrors::from(e),
        };

        match parse_date(&self.fecha_nacimiento) {
            None => errors.insert(
                "fecha_nacimiento",
                "Ingresa una fecha de nacimiento válida",
            ),
            Some(birth) if birth > today => errors.insert(
                "fecha_nacimiento",
                "La fecha de nacimiento no puede estar en el futuro",
            ),
            Some(birth) if age_on(birth, today) < MINIMUM_AGE => errors.insert(
                "fecha_nacimiento",
                format!("Debes tener al menos {} años para registrarte", MINIMUM_AGE),
            ),
            Some(_) => {}
        }

        if !self.accepted_terms() {
            errors.insert(
                "acepta_terminos",
                "Debes aceptar los términos y condiciones",
            );
        }

        errors.into_result()
    }

    pub fn accepted_terms(&self) -> bool {
        matches!(
            self.acepta_terminos.as_deref().map(str::trim),
            Some("on" | "true" | "si" | "sí")
        )
    }

    pub fn to_persona(&self) -> NewPersona {
        NewPersona {
            nombre: self.nombre.trim().to_string(),
            apellido: self.apellido.trim().to_string(),
            tipo_identificacion: self.tipo_identificacion.trim().to_string(),
            numero_identificacion: self.numero_identificacion.trim().to_string(),
            fecha_nacimiento: self.fecha_nacimiento.trim().to_string(),
            correo: self.correo.trim().to_string(),
            telefono: self.telefono.trim().to_string(),
        }
    }

    /// Copy safe to render back into the form: passwords are dropped
    pub fn without_secrets(&self) -> Self {
        RegistrationForm {
            password: String::new(),
            confirmar_password: String::new(),
            ..self.clone()
        }
    }
}
