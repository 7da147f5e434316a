//! Java sources through the full pipeline

use facadegen::*;
use std::fs;
use tempfile::TempDir;

const WEATHER_SERVICE: &str = r#"package com.demo.service;

import com.unionhole.mcp.annotation.MCPService;
import org.springframework.stereotype.Service;

@Service
@MCPService(packageName = "com.demo.mcp")
public class WeatherService {

    /**
     * Get weather information for a specific city
     * @param cityName the city
     */
    public String getWeather(String cityName) {
        return "Sunny in " + cityName;
    }

    /**
     * Check whether it will rain
     * in the "next" few days
     */
    public boolean willRain(String cityName, int days) {
        return false;
    }

    private String internal() {
        return "";
    }
}
"#;

fn write_source(dir: &std::path::Path, content: &str) {
    let pkg = dir.join("com/demo/service");
    fs::create_dir_all(&pkg).unwrap();
    fs::write(pkg.join("WeatherService.java"), content).unwrap();
}

fn config() -> FacadeConfig {
    FacadeConfig::default()
}

#[test]
fn test_java_service_generates_facade() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("src");
    write_source(&src, WEATHER_SERVICE);

    let mut session = Session::from_config(&config(), Some(src.as_path())).unwrap();
    let mut provider = JavaSourceProvider::new([src.clone()]);
    let report = session.run(&mut provider);
    assert_eq!(report.created(), 1);

    let facade = fs::read_to_string(src.join("com/demo/mcp/WeatherServiceFacade.java")).unwrap();
    assert!(facade.starts_with("package com.demo.mcp;\n"));
    assert!(facade.contains("import com.demo.service.WeatherService;\n"));
    assert!(facade.contains("public class WeatherServiceFacade {"));
    assert!(facade.contains(
        "    @Tool(description = \"Get weather information for a specific city\")\n    public String getWeather(String cityName) {\n"
    ));
    assert!(facade.contains(
        "    @Tool(description = \"Check whether it will rain in the 'next' few days\")\n"
    ));
    assert!(facade.contains("            return service.willRain(cityName, days);\n"));
    assert!(!facade.contains("internal"));
}

#[test]
fn test_regenerating_from_sources_is_stable() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("src");
    write_source(&src, WEATHER_SERVICE);

    Session::from_config(&config(), Some(src.as_path()))
        .unwrap()
        .run(&mut JavaSourceProvider::new([src.clone()]));
    let facade_path = src.join("com/demo/mcp/WeatherServiceFacade.java");
    let first = fs::read_to_string(&facade_path).unwrap();

    // The generated facade lives under the scanned tree; it is not a service
    let mut session = Session::from_config(&config(), Some(src.as_path())).unwrap();
    let report = session.run(&mut JavaSourceProvider::new([src.clone()])).clone();
    assert_eq!(report.created(), 0);
    assert_eq!(report.added_methods(), 0);
    assert_eq!(fs::read_to_string(&facade_path).unwrap(), first);
}

#[test]
fn test_new_java_method_is_appended() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("src");
    write_source(&src, WEATHER_SERVICE);
    Session::from_config(&config(), Some(src.as_path()))
        .unwrap()
        .run(&mut JavaSourceProvider::new([src.clone()]));

    let extended = WEATHER_SERVICE.replace(
        "    private String internal()",
        "    /** Daily forecast */\n    public java.util.List<String> forecast(String cityName) {\n        return null;\n    }\n\n    private String internal()",
    );
    write_source(&src, &extended);

    let mut session = Session::from_config(&config(), Some(src.as_path())).unwrap();
    let report = session.run(&mut JavaSourceProvider::new([src.clone()])).clone();
    assert_eq!(report.added_methods(), 1);

    let facade = fs::read_to_string(src.join("com/demo/mcp/WeatherServiceFacade.java")).unwrap();
    assert!(facade.contains("    @Tool(description = \"Daily forecast\")\n    public java.util.List<String> forecast(String cityName) {\n"));
    assert!(facade.trim_end().ends_with('}'));
}
