use epd_ifc::core::ConfigProvider;
use epd_ifc::utils::error::EpdIfcError;
use epd_ifc::utils::validation::Validate;
use epd_ifc::{CliConfig, EtlEngine, IfcPipeline, LocalStorage, TomlConfig};
use std::io::Read;
use std::path::Path;
use tempfile::TempDir;

const PROPERTY_SETS: &str = "\
PropertySet,Description,PropertyName,DataType,IFCType,ISO22057GUID,Unit,Specification,EnumerationReference
LCAPset_EPDGeneralInformation,General information about the EPD,,,,,,,
,,EPDName,IfcLabel,IfcPropertySingleValue,guid-epd-name,,,
,,DeclaredUnit,IfcLabel,IfcPropertyEnumeratedValue,guid-declared-unit,,,PEnum_DeclaredUnit
,,ProductMass,IfcMassMeasure,IfcPropertySingleValue,guid-mass,kg,EN 15804+A2,
,,Verification,,IfcComplexProperty,,,,
LCAPset_EPDMethodologicalSpecification,,,,,,,,
,,InformationModule,IfcLabel,IfcPropertyListValue,guid-modules,,,
LCAPset_EnvironmentalIndicators,Core environmental impact indicators,,,,,,,
";

const ENUMERATIONS: &str = "\
Enumeration,DataType,EnumerationValues
PEnum_DeclaredUnit,,
,IfcLabel,m2
,IfcLabel,m3
,IfcLabel,kg
";

const COMPLEX_PROPERTIES: &str = "\
ComplexProperty,PropertyName,DataType,IFCType,ISO22057GUID,Specification
Verification,,,,,
,VerifierName,IfcLabel,IfcPropertySingleValue,guid-verifier,ISO 14025
,ThirdPartyVerified,IfcBoolean,IfcPropertySingleValue,guid-third-party,
";

const INDICATOR_ROWS: &str = "\
Indicator,RowName,Unit,DataType,ISO22057GUID
ClimateChange,,,,
,GWP-total,kg CO2 eq.,IfcReal,guid-gwp-total
,GWP-biogenic,kg CO2 eq.,IfcReal,guid-gwp-biogenic
OzoneDepletion,,,,
,ODP,kg CFC11 eq.,IfcReal,guid-odp
";

const MODULE_COLUMNS: &str = "\
Module,ISO22057GUID,Description,ReferenceTo
A1-A3,guid-a1a3,Product stage,LCAPset_ProductStage
C4,guid-c4,Disposal,
D,guid-d,Benefits and loads beyond the system boundary,
";

fn product_json() -> serde_json::Value {
    serde_json::json!({
        "epd": {
            "name": {"guid": "guid-epd-name", "value": "Leca IsoBlokk LSX 30"},
            "declaredUnit": {"guid": "guid-declared-unit", "value": "m2"},
            "mass": {"guid": "guid-mass", "value": 14.5},
            "verification": [
                {"guid": "guid-verifier", "value": "EPD-Norge"},
                {"guid": "guid-third-party", "value": "yes"}
            ],
            "modules": {"guid": "guid-modules", "value": "A1-A3;C4;D1"}
        },
        "results": [
            {"guid": "guid-gwp-total", "values": [
                {"guid": "guid-a1a3", "value": 98.2},
                {"guid": "guid-c4", "value": 1.5},
                {"guid": "guid-d", "value": -12.0}
            ]},
            {"guid": "guid-odp", "values": [
                {"guid": "guid-a1a3", "value": "4.1E-6"}
            ]}
        ]
    })
}

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let templates = dir.path().join("CSV");
        std::fs::create_dir_all(&templates).unwrap();
        for (name, content) in [
            ("psets.csv", PROPERTY_SETS),
            ("enumerations.csv", ENUMERATIONS),
            ("complexprops.csv", COMPLEX_PROPERTIES),
            ("tablerows.csv", INDICATOR_ROWS),
            ("tablecolumns.csv", MODULE_COLUMNS),
        ] {
            std::fs::write(templates.join(name), content).unwrap();
        }
        std::fs::write(
            dir.path().join("product.json"),
            serde_json::to_vec_pretty(&product_json()).unwrap(),
        )
        .unwrap();
        Self { dir }
    }

    fn path(&self, relative: &str) -> String {
        self.dir.path().join(relative).to_string_lossy().to_string()
    }

    fn cli_config(&self, demo: bool) -> CliConfig {
        CliConfig {
            property_sets: self.path("CSV/psets.csv"),
            enumerations: self.path("CSV/enumerations.csv"),
            complex_properties: self.path("CSV/complexprops.csv"),
            indicator_rows: self.path("CSV/tablerows.csv"),
            module_columns: self.path("CSV/tablecolumns.csv"),
            product_data: (!demo).then(|| self.path("product.json")),
            output_path: self.path("output"),
            file_name: "leca_isoblokk".to_string(),
            object_class: "IfcBuildingElementProxyType".to_string(),
            object_name: "Leca IsoBlokk LSX 30".to_string(),
            project_name: "Leca library".to_string(),
            demo,
            archive: false,
            verbose: false,
            monitor: false,
        }
    }

    async fn generate(&self, config: CliConfig) -> String {
        config.validate().unwrap();
        let storage = LocalStorage::new(config.output_path.clone());
        let pipeline = IfcPipeline::new(storage, config);
        let output_path = EtlEngine::new(pipeline).run().await.unwrap();
        std::fs::read_to_string(output_path).unwrap()
    }
}

#[tokio::test]
async fn test_product_data_is_embedded_in_element_type() {
    let fixture = Fixture::new();
    let text = fixture.generate(fixture.cli_config(false)).await;

    assert!(text.starts_with("ISO-10303-21;"));
    assert!(text.contains("FILE_SCHEMA(('IFC4X3'));"));
    assert!(text.contains("'Leca IsoBlokk LSX 30'"));
    assert!(text.contains("IFCPROJECTLIBRARY("));
    assert!(text.contains("IFCBUILDINGELEMENTPROXYTYPE("));

    assert!(text.contains("IFCPROPERTYSINGLEVALUE('EPDName',$,IFCLABEL('Leca IsoBlokk LSX 30'),$);"));
    assert!(text.contains("IFCPROPERTYSINGLEVALUE('ProductMass','EN 15804+A2',IFCMASSMEASURE(14.5),#"));
    assert!(text.contains("IFCSIUNIT(*,.MASSUNIT.,.KILO.,.GRAM.);"));
    assert!(text.contains("IFCPROPERTYENUMERATEDVALUE('DeclaredUnit',$,(IFCLABEL('m2')),#"));
    assert!(text.contains("IFCPROPERTYENUMERATION('PEnum_DeclaredUnit',(IFCLABEL('m2'),IFCLABEL('m3'),IFCLABEL('kg')),$);"));
    assert!(text.contains("IFCCOMPLEXPROPERTY('Verification',$,'Verification',(#"));
    assert!(text.contains("IFCPROPERTYSINGLEVALUE('VerifierName','ISO 14025',IFCLABEL('EPD-Norge'),$);"));
    assert!(text.contains("IFCPROPERTYSINGLEVALUE('ThirdPartyVerified',$,IFCBOOLEAN(.T.),$);"));
    assert!(text.contains(
        "IFCPROPERTYLISTVALUE('InformationModule',$,(IFCLABEL('A1-A3'),IFCLABEL('C4'),IFCLABEL('D1')),$);"
    ));
}

#[tokio::test]
async fn test_indicator_tables_use_declared_modules() {
    let fixture = Fixture::new();
    let text = fixture.generate(fixture.cli_config(false)).await;

    assert_eq!(text.matches("IFCTABLE(").count(), 2);
    // Indicator, Unit, A1-A3, C4, D; shared by both tables
    assert_eq!(text.matches("IFCTABLECOLUMN(").count(), 5);
    assert!(text.contains("IFCTABLECOLUMN('A1-A3','A1-A3','Product stage',$,#"));
    assert!(text.contains(
        "IFCREFERENCE('IfcBuildingElementProxyType','HasPropertySets','LCAPset_ProductStage',$,$);"
    ));

    assert!(text.contains(
        "IFCTABLEROW((IFCLABEL('GWP-total'),IFCLABEL('kg CO2 eq.'),IFCREAL(98.2),IFCREAL(1.5),IFCREAL(-12.)),$);"
    ));
    assert!(text.contains(
        "IFCTABLEROW((IFCLABEL('ODP'),IFCLABEL('kg CFC11 eq.'),IFCREAL(0.0000041),IFCLABEL('NaN'),IFCLABEL('NaN')),$);"
    ));
    assert!(!text.contains("GWP-biogenic"));

    assert!(text.contains("IFCPROPERTYREFERENCEVALUE('ClimateChange',$,'ClimateChangeResults',#"));
    assert!(text.contains("IFCTABLE('OzoneDepletionTable',"));
}

#[tokio::test]
async fn test_demo_building_gets_every_property_set() {
    let fixture = Fixture::new();
    let mut config = fixture.cli_config(true);
    config.object_class = "IfcBuilding".to_string();
    config.object_name = "Demo building".to_string();

    let text = fixture.generate(config).await;

    assert!(text.contains("IFCBUILDING("));
    assert!(text.contains(".ELEMENT."));
    assert!(text.contains("IFCRELAGGREGATES("));
    assert!(!text.contains("IFCPROJECTLIBRARY("));
    assert_eq!(text.matches("IFCRELDEFINESBYPROPERTIES(").count(), 3);

    assert!(text.contains("IFCPROPERTYSINGLEVALUE('EPDName',$,IFCLABEL('NaN'),$);"));
    assert!(text.contains("IFCPROPERTYENUMERATEDVALUE('DeclaredUnit',$,(IFCLABEL('m2')),#"));
    assert_eq!(text.matches("IFCTABLE(").count(), 2);
    assert_eq!(text.matches("IFCTABLEROW(").count(), 3);
    assert!(text.contains(
        "IFCTABLEROW((IFCLABEL('GWP-biogenic'),IFCLABEL('kg CO2 eq.'),IFCREAL(0.),IFCREAL(0.),IFCREAL(0.)),$);"
    ));
}

#[tokio::test]
async fn test_toml_config_writes_archive() {
    let fixture = Fixture::new();
    let toml_content = format!(
        r#"
[model]
object_class = "IfcWallType"
object_name = "Lightweight concrete wall"

[templates]
property_sets = "{}"
enumerations = "{}"
complex_properties = "{}"
indicator_rows = "{}"
module_columns = "{}"

[product]
data = "{}"

[output]
path = "{}"
file_name = "wall"
archive = true
"#,
        fixture.path("CSV/psets.csv"),
        fixture.path("CSV/enumerations.csv"),
        fixture.path("CSV/complexprops.csv"),
        fixture.path("CSV/tablerows.csv"),
        fixture.path("CSV/tablecolumns.csv"),
        fixture.path("product.json"),
        fixture.path("toml-output"),
    );
    let config = TomlConfig::from_toml_str(&toml_content).unwrap();
    config.validate().unwrap();

    let output_dir = config.output_path().to_string();
    let pipeline = IfcPipeline::new(LocalStorage::new(output_dir.clone()), config);
    let output_path = EtlEngine::new_with_monitoring(pipeline, true).run().await.unwrap();

    assert!(output_path.ends_with("wall.ifc"));
    let text = std::fs::read_to_string(&output_path).unwrap();
    assert!(text.contains("IFCWALLTYPE("));
    assert!(text.contains(".NOTDEFINED."));

    let zip_data = std::fs::read(Path::new(&output_dir).join("wall.ifczip")).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
    let mut entry = archive.by_name("wall.ifc").unwrap();
    let mut archived = String::new();
    entry.read_to_string(&mut archived).unwrap();
    assert_eq!(archived, text);
}

#[tokio::test]
async fn test_missing_product_data_fails_validation() {
    let fixture = Fixture::new();
    let mut config = fixture.cli_config(false);
    config.product_data = None;

    let err = config.validate().unwrap_err();
    assert!(matches!(err, EpdIfcError::MissingConfigError { ref field } if field == "product_data"));
    assert_eq!(err.severity().exit_code(), 1);
}

#[tokio::test]
async fn test_malformed_template_stops_the_run() {
    let fixture = Fixture::new();
    std::fs::write(
        fixture.path("CSV/psets.csv"),
        "PropertySet,PropertyName,DataType,IFCType,ISO22057GUID\n,Orphan,IfcLabel,IfcPropertySingleValue,g\n",
    )
    .unwrap();

    let config = fixture.cli_config(true);
    let output_dir = config.output_path.clone();
    let pipeline = IfcPipeline::new(LocalStorage::new(output_dir.clone()), config);
    let err = EtlEngine::new(pipeline).run().await.unwrap_err();

    assert!(matches!(err, EpdIfcError::TemplateStructureError { .. }));
    assert!(err.to_string().contains("row 2 has no group above it"));
    assert!(!Path::new(&output_dir).join("leca_isoblokk.ifc").exists());
}
