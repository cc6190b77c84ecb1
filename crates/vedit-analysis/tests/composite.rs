//! Cross-file dynamic and portal detection.

mod common;

use common::{analyzer_for, create_test_project, element};
use tempfile::TempDir;

#[test]
fn test_imported_dynamic_composite() {
    let temp = TempDir::new().unwrap();
    let root = create_test_project(
        &temp,
        &[
            ("src/components/Badge.jsx", "export const Badge = ({ n }) => <span>{n}</span>;\n"),
            ("src/components/Logo.jsx", "export default function Logo() { return <img alt=\"logo\" />; }\n"),
            ("src/components/index.js", "export { Badge } from \"./Badge\";\n"),
            (
                "src/App.jsx",
                r#"import { Badge } from "./components";
import Logo from "./components/Logo";
export const App = () => <div><Badge /><Logo /></div>;
"#,
            ),
        ],
    );
    let mut analyzer = analyzer_for(&root);
    let app = analyzer.module(&root.join("src/App.jsx")).unwrap();

    assert!(analyzer.detect_dynamic_composite(&app, element(&app, "Badge")));
    assert!(!analyzer.detect_dynamic_composite(&app, element(&app, "Logo")));
}

#[test]
fn test_import_cycle_terminates() {
    let temp = TempDir::new().unwrap();
    let root = create_test_project(
        &temp,
        &[
            ("src/A.jsx", "import { B } from \"./B\";\nexport const A = wrap(B);\n"),
            ("src/B.jsx", "import { A } from \"./A\";\nexport const B = wrap(A);\n"),
            ("src/App.jsx", "import { A } from \"./A\";\nexport const App = () => <A />;\n"),
        ],
    );
    let mut analyzer = analyzer_for(&root);
    let app = analyzer.module(&root.join("src/App.jsx")).unwrap();
    assert!(!analyzer.detect_dynamic_composite(&app, element(&app, "A")));
    assert!(!analyzer.detect_portal_like(&app, element(&app, "A")));
}

#[test]
fn test_depth_cap_stops_recursion() {
    let temp = TempDir::new().unwrap();
    let root = create_test_project(
        &temp,
        &[
            ("src/L4.jsx", "export const L4 = ({ x }) => <p>{x}</p>;\n"),
            ("src/L3.jsx", "export { L4 as L3 } from \"./L4\";\n"),
            ("src/L2.jsx", "export { L3 as L2 } from \"./L3\";\n"),
            ("src/L1.jsx", "export { L2 as L1 } from \"./L2\";\n"),
            ("src/L0.jsx", "export { L1 as L0 } from \"./L1\";\n"),
            (
                "src/App.jsx",
                "import { L0 } from \"./L0\";\nimport { L2 } from \"./L2\";\nexport const App = () => <div><L0 /><L2 /></div>;\n",
            ),
        ],
    );
    // Flags are cached per export, so each chain gets a fresh session
    let check = |name: &str| {
        let mut analyzer = analyzer_for(&root);
        let app = analyzer.module(&root.join("src/App.jsx")).unwrap();
        analyzer.detect_dynamic_composite(&app, element(&app, name))
    };
    // L0 needs five files to reach markup; L2 needs three
    assert!(!check("L0"));
    assert!(check("L2"));
}

#[test]
fn test_imported_composite_portal() {
    let temp = TempDir::new().unwrap();
    let root = create_test_project(
        &temp,
        &[
            (
                "src/components/Menu.jsx",
                r#"import { Sheet, SheetContent } from "@/components/ui/sheet";
function Panel() { return <SheetContent>Links</SheetContent>; }
export default function Menu() { return <Sheet><Panel /></Sheet>; }
"#,
            ),
            ("src/components/Card.jsx", "export const Card = () => <section>Card</section>;\n"),
            (
                "src/App.jsx",
                r#"import Menu from "./components/Menu";
import { Card } from "./components/Card";
export const App = () => <div><Menu /><Card /></div>;
"#,
            ),
        ],
    );
    let mut analyzer = analyzer_for(&root);
    let app = analyzer.module(&root.join("src/App.jsx")).unwrap();

    assert!(analyzer.usage_is_composite_portal(&app, element(&app, "Menu")));
    assert!(analyzer.detect_portal_like(&app, element(&app, "Menu")));
    assert!(!analyzer.detect_portal_like(&app, element(&app, "Card")));
}
