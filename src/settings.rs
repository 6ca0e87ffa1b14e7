#[derive(Clone, Debug)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            url: "sqlite://cardapio.db".to_string(),
            max_connections: 5,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub debug: bool,
    pub host: String,
    pub port: u16,
    pub database: DatabaseSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            debug: false,
            host: "127.0.0.1".to_string(),
            port: 8000,
            database: DatabaseSettings::default(),
        }
    }
}
