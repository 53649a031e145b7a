//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly; Diesel uses
//! them for compile-time query validation and type-safe SQL generation.
//! Column names keep the legacy Spanish naming so the wire contract and the
//! database stay aligned.

diesel::table! {
    /// Client records.
    cliente (cli_id) {
        /// Primary key, assigned by the database sequence.
        cli_id -> Int4,
        /// Display name.
        cli_nombre -> Varchar,
        /// Contact email.
        cli_correo -> Varchar,
        /// Active flag.
        cli_estado -> Bool,
    }
}

diesel::table! {
    /// Product catalogue.
    producto (pro_id) {
        /// Primary key, assigned by the database sequence.
        pro_id -> Int4,
        /// Display name.
        pro_nombre -> Varchar,
        /// Sale price per unit.
        pro_pvp -> Numeric,
        /// Tax rate percentage, defaulted to 15.00 by the schema.
        pro_impuesto -> Numeric,
        /// Active flag.
        pro_estado -> Bool,
    }
}

diesel::table! {
    /// Invoice headers.
    factura (fac_id) {
        /// Primary key, assigned by the database sequence.
        fac_id -> Int4,
        /// Owning client.
        cli_id -> Int4,
        /// Issue date, stored as text.
        fac_fecha -> Varchar,
    }
}

diesel::table! {
    /// Invoice line items with composite identity.
    ///
    /// `facpro_pvp` and `facpro_impuesto` snapshot the product's price and
    /// tax rate at the moment the line was first added.
    factura_producto (fac_id, pro_id) {
        /// Owning invoice.
        fac_id -> Int4,
        /// Referenced product.
        pro_id -> Int4,
        /// Units sold, at least one.
        facpro_cantidad -> Int4,
        /// Unit price snapshot.
        facpro_pvp -> Numeric,
        /// Tax rate snapshot.
        facpro_impuesto -> Numeric,
    }
}

diesel::table! {
    /// Application users.
    usuario (usu_id) {
        /// Primary key, assigned by the database sequence.
        usu_id -> Int4,
        /// Unique login name.
        usu_username -> Varchar,
        /// Salted argon2 hash of the password.
        usu_password -> Varchar,
        /// Access role, `admin` or `client`.
        usu_rol -> Varchar,
        /// Optional link to the client this login belongs to.
        cli_id -> Nullable<Int4>,
    }
}

diesel::joinable!(factura -> cliente (cli_id));
diesel::joinable!(factura_producto -> factura (fac_id));
diesel::joinable!(factura_producto -> producto (pro_id));
diesel::joinable!(usuario -> cliente (cli_id));

diesel::allow_tables_to_appear_in_same_query!(
    cliente,
    producto,
    factura,
    factura_producto,
    usuario,
);
