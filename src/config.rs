use envconfig::Envconfig;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Envconfig, Debug, Clone)]
pub struct Config {
    #[envconfig(from = "APP_HOST", default = "0.0.0.0")]
    pub host: String,

    #[envconfig(from = "APP_PORT", default = "5000")]
    pub port: u16,

    #[envconfig(from = "UPLOAD_FOLDER", default = "./detected_vehicles")]
    pub upload_folder: PathBuf,

    /// Request bodies above this many bytes are refused with 413.
    #[envconfig(from = "MAX_CONTENT_LENGTH", default = "16777216")]
    pub max_content_length: u64,
}

impl Config {
    pub fn bind(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Resolves `host:port`, accepting host names as well as literal addresses.
    pub async fn socket_addr(&self) -> io::Result<SocketAddr> {
        tokio::net::lookup_host(self.bind())
            .await?
            .next()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::AddrNotAvailable,
                    format!("{} did not resolve to any address", self.bind()),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_camera_setup() {
        let config = Config::init_from_hashmap(&HashMap::new()).unwrap();
        assert_eq!(config.bind(), "0.0.0.0:5000");
        assert_eq!(config.upload_folder, PathBuf::from("./detected_vehicles"));
        assert_eq!(config.max_content_length, 16 * 1024 * 1024);
    }

    #[test]
    fn reads_overrides() {
        let mut vars = HashMap::new();
        vars.insert("APP_HOST".to_string(), "127.0.0.1".to_string());
        vars.insert("APP_PORT".to_string(), "8402".to_string());
        vars.insert("UPLOAD_FOLDER".to_string(), "/plates".to_string());
        vars.insert("MAX_CONTENT_LENGTH".to_string(), "1024".to_string());
        let config = Config::init_from_hashmap(&vars).unwrap();
        assert_eq!(config.bind(), "127.0.0.1:8402");
        assert_eq!(config.upload_folder, PathBuf::from("/plates"));
        assert_eq!(config.max_content_length, 1024);
    }

    #[test]
    fn rejects_bad_port() {
        let mut vars = HashMap::new();
        vars.insert("APP_PORT".to_string(), "not-a-port".to_string());
        assert!(Config::init_from_hashmap(&vars).is_err());
    }

    #[tokio::test]
    async fn resolves_literal_address() {
        let mut vars = HashMap::new();
        vars.insert("APP_HOST".to_string(), "127.0.0.1".to_string());
        vars.insert("APP_PORT".to_string(), "8402".to_string());
        let config = Config::init_from_hashmap(&vars).unwrap();
        let addr = config.socket_addr().await.unwrap();
        assert_eq!(addr, "127.0.0.1:8402".parse::<SocketAddr>().unwrap());
    }
}
