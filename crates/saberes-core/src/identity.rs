//! Identidad del actor autenticado.
//!
//! El core no autentica: recibe un `Actor` ya resuelto por el proveedor de
//! identidad. Las capacidades se derivan del `Role` asignado del lado del
//! servidor, nunca de comparar el correo contra un literal.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Puede explorar el directorio.
    #[default]
    Visitor,
    /// Puede registrar, editar y eliminar espacios.
    Curator,
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "visitor" => Ok(Role::Visitor),
            "curator" => Ok(Role::Curator),
            other => Err(format!("rol desconocido: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

impl Actor {
    pub fn new(id: Uuid, email: impl Into<String>, role: Role) -> Self {
        Self { id,
               email: email.into(),
               role }
    }

    pub fn can_manage_spaces(&self) -> bool {
        matches!(self.role, Role::Curator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_curators_manage_spaces() {
        let id = Uuid::new_v4();
        assert!(Actor::new(id, "a@b.co", Role::Curator).can_manage_spaces());
        assert!(!Actor::new(id, "a@b.co", Role::Visitor).can_manage_spaces());
    }

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("Curator".parse::<Role>(), Ok(Role::Curator));
        assert!("admin".parse::<Role>().is_err());
    }
}
