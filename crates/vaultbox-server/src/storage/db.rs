//! `SQLite` handle for the `VaultBox` server.

vaultbox_core::define_database!(VaultDatabase, "vault");
