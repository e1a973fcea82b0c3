//! Análisis semántico.
//!
//! Esta fase nunca aborta en el primer problema: todos los chequeos se
//! ejecutan siempre y acumulan diagnósticos, de manera que una sola
//! corrida reporta tantos errores independientes como sea posible. Una
//! lista de diagnósticos no vacía bloquea el paso a generación de
//! código intermedio.

use std::collections::{HashMap, HashSet};
use thiserror::Error;

use crate::{
    lex::Identifier,
    parse::{Category, GateOp, Program},
};

/// Información asociada a una señal en la tabla de símbolos.
#[derive(Debug, Clone)]
pub struct SymbolInfo {
    pub category: Category,

    /// Si la señal ya tiene un valor: las entradas y los cables nacen
    /// definidos, las salidas deben ser asignadas por alguna compuerta.
    pub defined: bool,

    /// Índice de la compuerta productora en `Program::gates`.
    pub source: Option<usize>,

    /// Salidas de las compuertas que consumen esta señal, una entrada
    /// por ocurrencia.
    pub used_by: Vec<Identifier>,
}

/// Tabla de símbolos con orden de inserción estable.
///
/// El orden de iteración determina el orden de los diagnósticos y de
/// las raíces de la búsqueda de ciclos, por lo cual debe ser
/// reproducible: primero las señales declaradas, en orden de
/// declaración, luego las salidas de compuerta no declaradas, en orden
/// de aparición.
#[derive(Debug, Default)]
pub struct SymbolTable {
    order: Vec<Identifier>,
    symbols: HashMap<Identifier, SymbolInfo>,
}

impl SymbolTable {
    pub fn get(&self, name: &Identifier) -> Option<&SymbolInfo> {
        self.symbols.get(name)
    }

    pub fn contains(&self, name: &Identifier) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Itera en orden de inserción.
    pub fn iter(&self) -> impl Iterator<Item = (&Identifier, &SymbolInfo)> {
        let symbols = &self.symbols;
        self.order.iter().map(move |name| (name, &symbols[name]))
    }

    /// Inserta sin sobreescribir. Retorna `false` si el nombre ya
    /// tenía una entrada.
    fn insert(&mut self, name: Identifier, info: SymbolInfo) -> bool {
        if self.symbols.contains_key(&name) {
            return false;
        }

        self.order.push(name.clone());
        self.symbols.insert(name, info);
        true
    }

    fn get_mut(&mut self, name: &Identifier) -> Option<&mut SymbolInfo> {
        self.symbols.get_mut(name)
    }
}

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SemanticError {
    #[error("Identifier `{0}` is already declared")]
    Redeclared(Identifier),

    #[error("Undeclared identifier `{0}` used in gate `{1}`")]
    Undeclared(Identifier, Identifier),

    #[error("Gate {op} requires {required} input(s), got {actual} in gate `{gate}`")]
    Arity {
        gate: Identifier,
        op: GateOp,
        required: usize,
        actual: usize,
    },

    #[error("Output `{0}` is never assigned")]
    UnassignedOutput(Identifier),

    #[error("Cannot assign to input `{0}`")]
    AssignToInput(Identifier),

    #[error("Combinational cycle detected: {}", join_path(.0))]
    Cycle(Vec<Identifier>),
}

fn join_path(path: &[Identifier]) -> String {
    path.iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Verifica un programa completo.
///
/// Retorna la tabla de símbolos validada o bien la lista ordenada y no
/// vacía de diagnósticos que invalida al programa.
pub fn analyze(ast: &Program) -> Result<SymbolTable, Vec<SemanticError>> {
    let mut analyzer = Analyzer {
        ast,
        table: SymbolTable::default(),
        errors: Vec::new(),
    };

    // Construcción de la tabla en dos pasadas: declarar y luego asociar
    // la información de compuertas
    analyzer.declare();
    analyzer.bind_gates();

    analyzer.check_undeclared();
    analyzer.check_arities();
    analyzer.check_outputs_defined();
    analyzer.check_input_assignments();
    analyzer.detect_cycles();

    if analyzer.errors.is_empty() {
        Ok(analyzer.table)
    } else {
        Err(analyzer.errors)
    }
}

struct Analyzer<'a> {
    ast: &'a Program,
    table: SymbolTable,
    errors: Vec<SemanticError>,
}

impl Analyzer<'_> {
    /// Primera pasada: una entrada por identificador declarado.
    fn declare(&mut self) {
        for declaration in &self.ast.declarations {
            for name in &declaration.identifiers {
                let info = SymbolInfo {
                    category: declaration.category,
                    defined: declaration.category != Category::Output,
                    source: None,
                    used_by: Vec::new(),
                };

                if !self.table.insert(name.clone(), info) {
                    self.errors.push(SemanticError::Redeclared(name.clone()));
                }
            }
        }
    }

    /// Segunda pasada: asocia cada compuerta con su señal de salida y
    /// registra los consumidores de cada entrada.
    fn bind_gates(&mut self) {
        for (index, gate) in self.ast.gates.iter().enumerate() {
            match self.table.get_mut(&gate.output) {
                Some(info) => {
                    info.defined = true;
                    info.source = Some(index);
                }

                // Una salida no declarada se registra como cable
                None => {
                    self.table.insert(
                        gate.output.clone(),
                        SymbolInfo {
                            category: Category::Wire,
                            defined: true,
                            source: Some(index),
                            used_by: Vec::new(),
                        },
                    );
                }
            }

            for input in &gate.inputs {
                if let Some(info) = self.table.get_mut(input) {
                    info.used_by.push(gate.output.clone());
                }
            }
        }
    }

    /// Toda entrada de compuerta debe resolver a una entrada de la
    /// tabla. Los literales `0`/`1` son constantes implícitas.
    fn check_undeclared(&mut self) {
        for gate in &self.ast.gates {
            for input in &gate.inputs {
                if input.as_constant().is_none() && !self.table.contains(input) {
                    self.errors
                        .push(SemanticError::Undeclared(input.clone(), gate.output.clone()));
                }
            }
        }
    }

    fn check_arities(&mut self) {
        for gate in &self.ast.gates {
            let required = gate.op.arity();
            let actual = gate.inputs.len();

            if actual != required {
                self.errors.push(SemanticError::Arity {
                    gate: gate.output.clone(),
                    op: gate.op,
                    required,
                    actual,
                });
            }
        }
    }

    fn check_outputs_defined(&mut self) {
        for (name, info) in self.table.iter() {
            if info.category == Category::Output && !info.defined {
                self.errors.push(SemanticError::UnassignedOutput(name.clone()));
            }
        }
    }

    fn check_input_assignments(&mut self) {
        for gate in &self.ast.gates {
            if let Some(info) = self.table.get(&gate.output) {
                if info.category == Category::Input {
                    self.errors
                        .push(SemanticError::AssignToInput(gate.output.clone()));
                }
            }
        }
    }

    /// Detección de lazos combinacionales.
    ///
    /// Las dependencias de una señal son las entradas de su compuerta
    /// productora; las señales sin productora son hojas. El recorrido
    /// usa una pila explícita en vez de recursión para no depender del
    /// límite de profundidad de la pila de llamadas en circuitos
    /// grandes.
    fn detect_cycles(&mut self) {
        let mut visited = HashSet::new();

        let roots: Vec<Identifier> = self.table.iter().map(|(name, _)| name.clone()).collect();
        for root in roots {
            if !visited.contains(&root) {
                self.search_cycle(root, &mut visited);
            }
        }
    }

    /// Recorre en profundidad desde `root` y reporta a lo sumo un ciclo.
    fn search_cycle(&mut self, root: Identifier, visited: &mut HashSet<Identifier>) {
        // `path` contiene exactamente las señales actualmente en la
        // pila; `on_path` es su conjunto de membresía
        let mut stack: Vec<(Identifier, usize)> = vec![(root.clone(), 0)];
        let mut path = vec![root.clone()];

        let mut on_path = HashSet::new();
        on_path.insert(root.clone());
        visited.insert(root);

        while let Some(frame) = stack.last_mut() {
            let node = frame.0.clone();
            let index = frame.1;
            frame.1 += 1;

            let next = self.dependencies(&node).get(index).cloned();
            match next {
                // Se agotaron las dependencias de esta señal
                None => {
                    stack.pop();
                    path.pop();
                    on_path.remove(&node);
                }

                Some(next) => {
                    if on_path.contains(&next) {
                        // La señal repetida ya está en `path`
                        let start = path.iter().position(|name| name == &next).unwrap();

                        let mut cycle = path[start..].to_vec();
                        cycle.push(next);

                        self.errors.push(SemanticError::Cycle(cycle));
                        return;
                    }

                    if visited.insert(next.clone()) {
                        on_path.insert(next.clone());
                        path.push(next.clone());
                        stack.push((next, 0));
                    }
                }
            }
        }
    }

    /// Entradas de la compuerta productora de `name`, si la hay.
    fn dependencies(&self, name: &Identifier) -> &[Identifier] {
        self.table
            .get(name)
            .and_then(|info| info.source)
            .map(|index| &self.ast.gates[index].inputs[..])
            .unwrap_or(&[])
    }
}
