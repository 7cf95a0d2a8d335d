//! Prompt constants for generation and judging.
//!
//! Prompt versioning: bump `PROMPT_VERSION` whenever preamble content
//! changes, so logged eval runs can be traced back to the prompt that
//! produced them.

/// Prompt version. Bump on any preamble content change.
pub const PROMPT_VERSION: &str = "1.2.0";

/// Condensed tscircuit syntax primer fed to the generation model.
pub const CIRCUIT_SYNTAX_PRIMER: &str = r#"
Here's a quick primer on how to use tscircuit:

## Core `<chip />` props (most-used)

* `name`: reference designator (e.g., "U1").
* `footprint`: string (e.g., "soic8"/"0402") or a `<footprint />` element.
* `pinLabels`: map pad -> pin label (e.g., { pin1: "VCC", pin5: "GND" }).
* `schPinArrangement`: control schematic sides/order of pins.
* Connectivity helpers: `internallyConnectedPins`, `externallyConnectedPins`,
  and `connections` (auto-traces by pin label).

## Minimal chip

<chip
  name="U1"
  footprint="soic8"
  pinLabels={{ pin1: "VCC", pin2: "DISCH", pin3: "THRES", pin4: "CTRL",
               pin5: "GND", pin6: "TRIG", pin7: "OUT", pin8: "RESET" }}
/>

## Passives and traces

<resistor name="R1" resistance="10k" footprint="0402" />
<capacitor name="C1" capacitance="10uF" footprint="0603" />
<led name="LED1" color="red" footprint="0603" />
<trace from=".R1 .pin1" to=".LED1 .anode" />

Selectors use `.Name .pin`; nets are referenced as `net.VCC` / `net.GND`.
Avoid raw `pcbX`/`pcbY` coordinates — they are a deprecated pattern.
"#;

/// System preamble for the generation model.
pub fn generation_preamble() -> String {
    format!(
        "You are an expert at generating tscircuit code. Generate valid tscircuit \
         code based on the user's prompt.\n\
         {CIRCUIT_SYNTAX_PRIMER}\n\
         Always return the code wrapped in a proper export default function like this:\n\n\
         ```tsx\n\
         export default () => (\n\
         \x20 <board width=\"20mm\" height=\"20mm\">\n\
         \x20   // Your circuit components here\n\
         \x20 </board>\n\
         )\n\
         ```\n\n\
         Make sure to:\n\
         - Use proper component names and properties\n\
         - Include appropriate footprints\n\
         - Add traces to connect components\n\
         - Use valid resistance, capacitance, and other values\n\
         - Follow tscircuit syntax exactly as shown in the documentation above"
    )
}

/// Judge prompt for the AI circuit validator. `output` is the generated
/// code under review, `input` the prompt that produced it.
pub fn validator_prompt(input: &str, output: &str) -> String {
    format!(
        "You are an expert tscircuit validator. Analyze the following tscircuit \
         code and determine if it's valid.\n\n\
         tscircuit code to validate:\n```tsx\n{output}\n```\n\n\
         Context/prompt that generated this code:\n```\n{input}\n```\n\n\
         Check for the following issues:\n\
         1. Invalid elements - components that don't exist in tscircuit\n\
         2. Raw x/y coordinates - tscircuit prefers layout helpers over manual positioning\n\
         3. Missing connections - components that should be connected but aren't\n\
         4. Syntax errors - TypeScript/TSX compilation issues\n\
         5. Improper component usage - wrong props or usage patterns\n\
         6. Missing required props - essential props like name, footprint missing\n\
         7. Invalid footprints - footprint names that don't exist\n\
         8. Improper trace connections - invalid from/to selectors\n\
         9. Deprecated syntax - old patterns that should be updated\n\
         10. Logical errors - electrical issues like shorts, missing power\n\n\
         Respond with a single JSON object containing these boolean fields:\n\
         has_invalid_element, uses_xy_coordinates, missing_connection, \
         has_syntax_errors, improper_component_usage, missing_required_props, \
         invalid_footprint, improper_trace_connections, uses_deprecated_syntax, \
         has_logical_errors — true when the issue exists, false when it \
         doesn't — plus a string field `rationale` explaining your findings."
    )
}
